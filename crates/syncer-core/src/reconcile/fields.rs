//! Field Reconciler (C4): per-table diff of top-level fields against the
//! catalog, with C1 special-type inference resolved for new and existing
//! fields alike. Nested fields are not handled here — they are owned by the
//! C2 classifier pipeline's nested-fields stage, which only runs once a
//! parent `DictionaryField` has already been reconciled by this pass.

use std::collections::HashMap;

use syncer_store::{CatalogStore, Field, FieldUpdate, NewField, Table, TableUpdate};
use tracing::info;

use crate::domain::{Result, SyncError};
use crate::driver::Driver;
use crate::inference::{infer_special_type, FieldDescriptor};

/// Reconcile the top-level fields of `table`, returning the active set
/// after the pass. Requires `table.display_name` to already be resolved by
/// the caller (see [`ensure_display_name`]).
pub async fn reconcile_fields<D, S>(driver: &D, store: &S, table: &Table) -> Result<Vec<Field>>
where
    D: Driver,
    S: CatalogStore,
{
    let described = driver.describe_table(table).await?;
    for field in &described.fields {
        if field.name.is_empty() {
            return Err(SyncError::DriverContractViolation(format!(
                "describe_table for {:?} returned a field with an empty name",
                table.name
            )));
        }
    }

    let existing = store.list_active_fields(table.id, None).await?;
    let existing_by_name: HashMap<&str, &Field> =
        existing.iter().map(|f| (f.name.as_str(), f)).collect();
    let incoming_names: std::collections::HashSet<&str> =
        described.fields.iter().map(|f| f.name.as_str()).collect();

    let to_deactivate: Vec<_> = existing
        .iter()
        .filter(|f| !incoming_names.contains(f.name.as_str()))
        .map(|f| f.id)
        .collect();
    if !to_deactivate.is_empty() {
        info!(event = "fields-deactivated", table_id = %table.id, count = to_deactivate.len());
        store.deactivate_fields(&to_deactivate).await?;
    }

    let mut active: Vec<Field> = existing
        .iter()
        .filter(|f| !to_deactivate.contains(&f.id))
        .cloned()
        .collect();

    for incoming in &described.fields {
        let prior = existing_by_name.get(incoming.name.as_str()).copied();

        let special_type = prior
            .and_then(|f| f.special_type)
            .or_else(|| {
                infer_special_type(FieldDescriptor {
                    name: &incoming.name,
                    base_type: incoming.base_type,
                    is_pk: incoming.is_pk,
                    prior_special_type: None,
                })
            });
        let display_name = prior
            .and_then(|f| f.display_name.clone())
            .unwrap_or_else(|| store.name_to_human_readable(&incoming.name));

        match prior {
            None => {
                info!(event = "field-created", table_id = %table.id, name = %incoming.name);
                let field = store
                    .insert_field(NewField {
                        table_id: table.id,
                        parent_id: None,
                        name: incoming.name.clone(),
                        base_type: incoming.base_type,
                        special_type,
                        display_name: Some(display_name),
                    })
                    .await?;
                active.push(field);
            }
            Some(existing_field) => {
                let base_type_changed = existing_field.base_type != incoming.base_type;
                let special_type_changed = existing_field.special_type != special_type;
                let display_name_changed =
                    existing_field.display_name.as_deref() != Some(display_name.as_str());

                if base_type_changed || special_type_changed || display_name_changed {
                    // special_type only ever transitions None -> Some here:
                    // a prior value always wins and is carried through
                    // unchanged (see the `special_type` resolution above).
                    let updated = store
                        .update_field(
                            existing_field.id,
                            FieldUpdate {
                                display_name: display_name_changed.then_some(display_name),
                                base_type: base_type_changed.then_some(incoming.base_type),
                                special_type: if special_type_changed { special_type } else { None },
                                ..Default::default()
                            },
                        )
                        .await?;
                    if let Some(slot) = active.iter_mut().find(|f| f.id == updated.id) {
                        *slot = updated;
                    }
                }
            }
        }
    }

    Ok(active)
}

/// Step 1 of C4: ensure `table` has a `display_name`, deriving one from its
/// raw name if absent. Run once per table, before [`reconcile_fields`].
pub async fn ensure_display_name<S: CatalogStore>(store: &S, table: &Table) -> Result<Table> {
    if table.display_name.is_some() {
        return Ok(table.clone());
    }
    let display_name = store.name_to_human_readable(&table.name);
    let updated = store
        .update_table(
            table.id,
            TableUpdate {
                display_name: Some(display_name),
                ..Default::default()
            },
        )
        .await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;
    use syncer_store::{BaseType, DatabaseId, MemoryCatalogStore, SpecialType, TableId};

    fn users_table() -> Table {
        Table {
            id: TableId(1),
            db_id: DatabaseId(1),
            schema: None,
            name: "users".into(),
            display_name: Some("Users".into()),
            active: true,
            rows: None,
            description: None,
            caveats: None,
            points_of_interest: None,
            entity_type: None,
            show_in_getting_started: false,
        }
    }

    #[tokio::test]
    async fn inserts_new_fields_with_inferred_special_type() {
        let driver = FakeDriver::builder()
            .pk_field("users", "id", BaseType::IntegerField)
            .field("users", "email", BaseType::CharField)
            .field("users", "latitude", BaseType::FloatField)
            .build();
        let store = MemoryCatalogStore::new();

        let fields = reconcile_fields(&driver, &store, &users_table()).await.unwrap();
        assert_eq!(fields.len(), 3);

        let id_field = fields.iter().find(|f| f.name == "id").unwrap();
        assert_eq!(id_field.special_type, Some(SpecialType::Id));

        let lat_field = fields.iter().find(|f| f.name == "latitude").unwrap();
        assert_eq!(lat_field.special_type, Some(SpecialType::Latitude));

        let email_field = fields.iter().find(|f| f.name == "email").unwrap();
        assert_eq!(email_field.special_type, None);
    }

    #[tokio::test]
    async fn never_overwrites_an_existing_special_type() {
        let driver = FakeDriver::builder()
            .field("users", "status", BaseType::CharField)
            .build();
        let store = MemoryCatalogStore::new();

        let first = reconcile_fields(&driver, &store, &users_table()).await.unwrap();
        let status = first.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.special_type, Some(SpecialType::Category));

        // Manually force a different special_type, simulating prior manual
        // curation; a second reconcile pass must leave it untouched.
        store
            .update_field(
                status.id,
                FieldUpdate {
                    special_type: Some(SpecialType::Name),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let second = reconcile_fields(&driver, &store, &users_table()).await.unwrap();
        let status = second.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.special_type, Some(SpecialType::Name));
    }

    #[tokio::test]
    async fn deactivates_fields_missing_from_second_describe() {
        let store = MemoryCatalogStore::new();

        let first = FakeDriver::builder()
            .field("users", "nickname", BaseType::CharField)
            .build();
        reconcile_fields(&first, &store, &users_table()).await.unwrap();

        let second = FakeDriver::builder().build();
        let active = reconcile_fields(&second, &store, &users_table()).await.unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_field_name() {
        let driver = FakeDriver::builder().field("users", "", BaseType::CharField).build();
        let store = MemoryCatalogStore::new();

        let err = reconcile_fields(&driver, &store, &users_table()).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
