//! Metadata-Table Interpreter (C6): treats rows of a magic
//! `_metabase_metadata` table as out-of-band patches to catalog entities.
//!
//! Unlike the source system, `property_key` is restricted to a closed
//! allow-list per entity rather than an arbitrary column name — an unknown
//! key is logged and skipped rather than attempted.

use std::sync::OnceLock;

use regex::Regex;
use syncer_store::{CatalogStore, Database, FieldUpdate, SpecialType, TableUpdate};
use tracing::error;

use crate::config::SyncConfig;
use crate::domain::Result;
use crate::driver::{Driver, MetadataRow};

/// Table property keys the interpreter is allowed to set.
const TABLE_PROPERTIES: &[&str] = &[
    "description",
    "caveats",
    "points_of_interest",
    "entity_type",
    "show_in_getting_started",
];

/// Field property keys the interpreter is allowed to set.
const FIELD_PROPERTIES: &[&str] = &["description", "special_type"];

fn keypath_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^.]+)\.(?:([^.]+)\.)?([^.]+)$").unwrap())
}

/// Interpret the rows of the `_metabase_metadata` table, if the driver
/// reports any, applying each as a patch to the matching Table or Field.
/// Any single row's failure is logged and does not abort the pass.
pub async fn reconcile_metadata_table<D, S>(driver: &D, store: &S, cfg: &SyncConfig, db: &Database) -> Result<()>
where
    D: Driver,
    S: CatalogStore,
{
    let Some(rows) = driver.table_rows_seq(db, cfg.metadata_table_name).await? else {
        return Ok(());
    };

    for row in rows {
        if let Err(e) = apply_row(store, db, &row).await {
            error!(event = "metadata-row-failed", keypath = %row.keypath, error = %e);
        }
    }
    Ok(())
}

async fn apply_row<S: CatalogStore>(store: &S, db: &Database, row: &MetadataRow) -> Result<()> {
    let caps = keypath_pattern()
        .captures(&row.keypath)
        .ok_or_else(|| crate::domain::SyncError::PerUnitFailure {
            unit: row.keypath.clone(),
            source: Box::new(crate::domain::SyncError::DriverContractViolation(format!(
                "malformed metadata keypath {:?}",
                row.keypath
            ))),
        })?;

    let table_name = &caps[1];
    let field_name = caps.get(2).map(|m| m.as_str());
    let property_key = &caps[3];

    if let Some(field_name) = field_name {
        apply_field_patch(store, db, table_name, field_name, property_key, &row.value).await
    } else {
        apply_table_patch(store, db, table_name, property_key, &row.value).await
    }
}

async fn apply_field_patch<S: CatalogStore>(
    store: &S,
    db: &Database,
    table_name: &str,
    field_name: &str,
    property_key: &str,
    value: &serde_json::Value,
) -> Result<()> {
    if !FIELD_PROPERTIES.contains(&property_key) {
        error!(
            event = "metadata-unknown-property",
            entity = "field",
            property = %property_key,
        );
        return Ok(());
    }
    let Some(field) = store
        .find_field_by_table_name(db.id, table_name, field_name)
        .await?
    else {
        error!(
            event = "metadata-no-match",
            entity = "field",
            table = %table_name,
            field = %field_name,
        );
        return Ok(());
    };

    let patch = match property_key {
        "description" => FieldUpdate {
            description: Some(value_as_string(value)),
            ..Default::default()
        },
        "special_type" => match serde_json::from_value::<SpecialType>(value.clone()) {
            Ok(special_type) => FieldUpdate {
                special_type: Some(special_type),
                ..Default::default()
            },
            Err(_) => {
                error!(
                    event = "metadata-invalid-value",
                    entity = "field",
                    property = %property_key,
                    value = %value,
                );
                return Ok(());
            }
        },
        _ => unreachable!("property_key checked against FIELD_PROPERTIES above"),
    };
    store.update_field(field.id, patch).await?;
    Ok(())
}

async fn apply_table_patch<S: CatalogStore>(
    store: &S,
    db: &Database,
    table_name: &str,
    property_key: &str,
    value: &serde_json::Value,
) -> Result<()> {
    if !TABLE_PROPERTIES.contains(&property_key) {
        error!(
            event = "metadata-unknown-property",
            entity = "table",
            property = %property_key,
        );
        return Ok(());
    }
    let Some(table) = store.find_table_by_name(db.id, table_name).await? else {
        error!(event = "metadata-no-match", entity = "table", table = %table_name);
        return Ok(());
    };

    let patch = match property_key {
        "description" => TableUpdate {
            description: Some(value_as_string(value)),
            ..Default::default()
        },
        "caveats" => TableUpdate {
            caveats: Some(value_as_string(value)),
            ..Default::default()
        },
        "points_of_interest" => TableUpdate {
            points_of_interest: Some(value_as_string(value)),
            ..Default::default()
        },
        "entity_type" => TableUpdate {
            entity_type: Some(value_as_string(value)),
            ..Default::default()
        },
        "show_in_getting_started" => match serde_json::from_value::<bool>(value.clone()) {
            Ok(flag) => TableUpdate {
                show_in_getting_started: Some(flag),
                ..Default::default()
            },
            Err(_) => {
                error!(
                    event = "metadata-invalid-value",
                    entity = "table",
                    property = %property_key,
                    value = %value,
                );
                return Ok(());
            }
        },
        _ => unreachable!("property_key checked against TABLE_PROPERTIES above"),
    };
    store.update_table(table.id, patch).await?;
    Ok(())
}

/// Render a metadata value as a string for storage, regardless of its JSON
/// type. Coercion into typed columns (bool, int, nested JSON) is unspecified
/// upstream and left as-is here.
fn value_as_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;
    use syncer_store::{BaseType, DatabaseId, MemoryCatalogStore, NewField, NewTable};

    #[tokio::test]
    async fn patches_field_description_without_materialising_metadata_table() {
        let store = MemoryCatalogStore::new();
        let db = Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        };
        let table = store
            .insert_table(NewTable {
                db_id: db.id,
                schema: None,
                name: "users".into(),
            })
            .await
            .unwrap();
        store
            .insert_field(NewField {
                table_id: table.id,
                parent_id: None,
                name: "email".into(),
                base_type: BaseType::CharField,
                special_type: None,
                display_name: Some("Email".into()),
            })
            .await
            .unwrap();

        let driver = FakeDriver::builder()
            .metadata_rows(vec![crate::driver::MetadataRow {
                keypath: "users.email.description".into(),
                value: serde_json::json!("User email"),
            }])
            .build();
        let cfg = SyncConfig::default();

        reconcile_metadata_table(&driver, &store, &cfg, &db).await.unwrap();

        let field = store.find_field(table.id, None, "email").await.unwrap().unwrap();
        assert_eq!(field.description.as_deref(), Some("User email"));

        let tables = store.list_active_tables(db.id).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");
    }

    #[tokio::test]
    async fn unknown_property_key_is_skipped_not_fatal() {
        let store = MemoryCatalogStore::new();
        let db = Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        };
        store
            .insert_table(NewTable {
                db_id: db.id,
                schema: None,
                name: "users".into(),
            })
            .await
            .unwrap();

        let driver = FakeDriver::builder()
            .metadata_rows(vec![crate::driver::MetadataRow {
                keypath: "users.totally_unknown_property".into(),
                value: serde_json::json!("whatever"),
            }])
            .build();
        let cfg = SyncConfig::default();

        reconcile_metadata_table(&driver, &store, &cfg, &db).await.unwrap();
    }

    #[tokio::test]
    async fn patches_field_special_type() {
        let store = MemoryCatalogStore::new();
        let db = Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        };
        let table = store
            .insert_table(NewTable {
                db_id: db.id,
                schema: None,
                name: "users".into(),
            })
            .await
            .unwrap();
        store
            .insert_field(NewField {
                table_id: table.id,
                parent_id: None,
                name: "status".into(),
                base_type: BaseType::CharField,
                special_type: None,
                display_name: Some("Status".into()),
            })
            .await
            .unwrap();

        let driver = FakeDriver::builder()
            .metadata_rows(vec![crate::driver::MetadataRow {
                keypath: "users.status.special_type".into(),
                value: serde_json::json!("category"),
            }])
            .build();
        let cfg = SyncConfig::default();

        reconcile_metadata_table(&driver, &store, &cfg, &db).await.unwrap();

        let field = store.find_field(table.id, None, "status").await.unwrap().unwrap();
        assert_eq!(field.special_type, Some(syncer_store::SpecialType::Category));
    }

    #[tokio::test]
    async fn patches_table_show_in_getting_started() {
        let store = MemoryCatalogStore::new();
        let db = Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        };
        store
            .insert_table(NewTable {
                db_id: db.id,
                schema: None,
                name: "users".into(),
            })
            .await
            .unwrap();

        let driver = FakeDriver::builder()
            .metadata_rows(vec![crate::driver::MetadataRow {
                keypath: "users.show_in_getting_started".into(),
                value: serde_json::json!(true),
            }])
            .build();
        let cfg = SyncConfig::default();

        reconcile_metadata_table(&driver, &store, &cfg, &db).await.unwrap();

        let table = store.find_table_by_name(db.id, "users").await.unwrap().unwrap();
        assert!(table.show_in_getting_started);
    }
}
