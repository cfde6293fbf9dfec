//! Table Reconciler (C3): diffs the driver's reported active tables against
//! the catalog, activating new tables and deactivating missing ones.

use std::collections::HashMap;

use syncer_store::{CatalogStore, Database, NewTable, Table};
use tracing::info;

use crate::config::SyncConfig;
use crate::domain::{Result, SyncError};
use crate::driver::Driver;

/// Reconcile tables for `db`, returning the full set of active tables after
/// the pass (existing survivors plus newly-created rows).
pub async fn reconcile_tables<D, S>(
    driver: &D,
    store: &S,
    cfg: &SyncConfig,
    db: &Database,
) -> Result<Vec<Table>>
where
    D: Driver,
    S: CatalogStore,
{
    let described = driver.describe_database(db).await?;

    let mut incoming: HashMap<(Option<String>, String), ()> = HashMap::new();
    for table in &described.tables {
        if table.name.is_empty() {
            return Err(SyncError::DriverContractViolation(
                "describe_database returned a table with an empty name".into(),
            ));
        }
        if table.name.to_lowercase() == cfg.metadata_table_name.to_lowercase() {
            continue;
        }
        incoming.insert((table.schema.clone(), table.name.clone()), ());
    }

    let existing = store.list_active_tables(db.id).await?;
    let existing_by_key: HashMap<(Option<String>, String), &Table> = existing
        .iter()
        .map(|t| ((t.schema.clone(), t.name.clone()), t))
        .collect();

    let to_deactivate: Vec<_> = existing
        .iter()
        .filter(|t| !incoming.contains_key(&(t.schema.clone(), t.name.clone())))
        .map(|t| t.id)
        .collect();
    if !to_deactivate.is_empty() {
        info!(
            event = "tables-deactivated",
            database_id = %db.id,
            count = to_deactivate.len(),
        );
        store.deactivate_tables(&to_deactivate).await?;
    }

    let mut active = existing
        .into_iter()
        .filter(|t| !to_deactivate.contains(&t.id))
        .collect::<Vec<_>>();

    for (schema, name) in incoming.keys() {
        if existing_by_key.contains_key(&(schema.clone(), name.clone())) {
            continue;
        }
        info!(
            event = "table-created",
            database_id = %db.id,
            name = %name,
        );
        let table = store
            .insert_table(NewTable {
                db_id: db.id,
                schema: schema.clone(),
                name: name.clone(),
            })
            .await?;
        active.push(table);
    }

    active.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;
    use syncer_store::{DatabaseId, MemoryCatalogStore};

    fn db() -> Database {
        Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        }
    }

    #[tokio::test]
    async fn creates_tables_and_filters_metadata_table() {
        let driver = FakeDriver::builder()
            .table("users", None)
            .table("_metabase_metadata", None)
            .build();
        let store = MemoryCatalogStore::new();
        let cfg = SyncConfig::default();

        let active = reconcile_tables(&driver, &store, &cfg, &db()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "users");
    }

    #[tokio::test]
    async fn deactivates_tables_missing_from_second_describe() {
        let store = MemoryCatalogStore::new();
        let cfg = SyncConfig::default();

        let first = FakeDriver::builder().table("products", None).build();
        let active = reconcile_tables(&first, &store, &cfg, &db()).await.unwrap();
        assert_eq!(active.len(), 1);

        let second = FakeDriver::builder().build();
        let active = reconcile_tables(&second, &store, &cfg, &db()).await.unwrap();
        assert!(active.is_empty());

        let all = store.list_active_tables(db().id).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_table_name() {
        let driver = FakeDriver::builder().table("", None).build();
        let store = MemoryCatalogStore::new();
        let cfg = SyncConfig::default();

        let err = reconcile_tables(&driver, &store, &cfg, &db()).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
