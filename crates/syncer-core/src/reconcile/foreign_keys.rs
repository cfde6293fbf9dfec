//! Foreign-Key Reconciler (C5): second-pass linker run only after every
//! table in the database has been field-reconciled, since a destination
//! column may live in a table synced later in the same run.

use syncer_store::{CatalogStore, Database, FieldUpdate, ForeignKey, NewForeignKey, Relationship, SpecialType, Table};
use tracing::info;

use crate::domain::Result;
use crate::driver::{Capability, Driver};

/// Resolve and persist foreign keys for every table in `tables`. No-op if
/// the driver does not advertise [`Capability::ForeignKeys`].
pub async fn reconcile_foreign_keys<D, S>(
    driver: &D,
    store: &S,
    db: &Database,
    tables: &[Table],
) -> Result<Vec<ForeignKey>>
where
    D: Driver,
    S: CatalogStore,
{
    if !driver.features().contains(&Capability::ForeignKeys) {
        return Ok(Vec::new());
    }

    let mut created = Vec::new();
    for table in tables {
        let described = driver.describe_table_fks(table).await?;
        for fk in described {
            let Some(origin) = store.find_field(table.id, None, &fk.fk_column_name).await? else {
                continue;
            };
            let Some(dest_table) = store
                .find_table(db.id, fk.dest_table_schema.as_deref(), &fk.dest_table_name)
                .await?
            else {
                continue;
            };
            let Some(dest_field) = store
                .find_field(dest_table.id, None, &fk.dest_column_name)
                .await?
            else {
                continue;
            };

            if let Some(existing_fk) = store.foreign_key_by_origin(origin.id).await? {
                created.push(existing_fk);
                continue;
            }

            let resolved = store
                .insert_foreign_key(NewForeignKey {
                    origin_field_id: origin.id,
                    destination_field_id: dest_field.id,
                    relationship: Relationship::ManyToOne,
                })
                .await?;

            // The one documented exception to "never replace special_type":
            // FK-ness overrides any prior inference unconditionally.
            store
                .update_field(
                    origin.id,
                    FieldUpdate {
                        special_type: Some(SpecialType::Fk),
                        ..Default::default()
                    },
                )
                .await?;

            info!(
                event = "foreign-key-created",
                origin_field_id = %origin.id,
                destination_field_id = %dest_field.id,
            );
            created.push(resolved);
        }
    }
    Ok(created)
}
