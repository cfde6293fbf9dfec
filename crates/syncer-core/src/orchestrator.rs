//! Sync Orchestrator (C7): drives the reconciliation phases in their
//! required order, isolates per-table/per-unit failures, and publishes
//! lifecycle events.

use std::time::Instant;

use syncer_store::{CatalogStore, Database, Table, TableUpdate};
use tracing::{error, info};
use uuid::Uuid;

use crate::classifiers::classify_field;
use crate::config::SyncConfig;
use crate::domain::Result;
use crate::driver::Driver;
use crate::events::{EventBus, SyncEvent, SyncSpan};
use crate::progress::render_progress;
use crate::reconcile::{ensure_display_name, reconcile_fields, reconcile_foreign_keys, reconcile_metadata_table, reconcile_tables};

/// Summary of one `sync_database` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub tables_synced: usize,
    pub tables_failed: usize,
    pub foreign_keys_created: usize,
}

/// Drives a Syncer run against one `Driver` / `CatalogStore` / `EventBus`
/// triple. Generic rather than trait-object-based: `Driver`'s
/// `sync_in_context` has a generic method, which would make `dyn Driver`
/// non-object-safe.
pub struct SyncOrchestrator<'a, D, S, E> {
    driver: &'a D,
    store: &'a S,
    events: &'a E,
    config: SyncConfig,
}

impl<'a, D, S, E> SyncOrchestrator<'a, D, S, E>
where
    D: Driver,
    S: CatalogStore,
    E: EventBus,
{
    pub fn new(driver: &'a D, store: &'a S, events: &'a E, config: SyncConfig) -> Self {
        Self {
            driver,
            store,
            events,
            config,
        }
    }

    /// Full database sync: C3, then C4 per table, then C5, then C6.
    pub async fn sync_database(&self, db: &Database, full_sync: bool) -> Result<SyncReport> {
        let custom_id = Uuid::new_v4();
        let _span = SyncSpan::enter(db.id, custom_id);
        self.events.publish(SyncEvent::DatabaseSyncBegin {
            database_id: db.id,
            custom_id,
        });

        let started = Instant::now();
        let report = self
            .driver
            .sync_in_context(db, || self.run_phases(db, full_sync))
            .await;

        self.events.publish(SyncEvent::DatabaseSyncEnd {
            database_id: db.id,
            custom_id,
            running_time_ms: started.elapsed().as_millis() as u64,
        });

        report
    }

    /// Single-table sync: C4 for one table only, then a `table-sync` event.
    pub async fn sync_table(&self, table: &Table, full_sync: bool) -> Result<Table> {
        let table = ensure_display_name(self.store, table).await?;
        reconcile_fields(self.driver, self.store, &table).await?;
        self.analyze_table(&table, full_sync).await?;
        self.events
            .publish(SyncEvent::TableSync { table_id: table.id });
        Ok(table)
    }

    async fn run_phases(&self, db: &Database, full_sync: bool) -> Result<SyncReport> {
        let active_tables = reconcile_tables(self.driver, self.store, &self.config, db).await?;
        let total = active_tables.len() as u64;

        let mut reconciled = Vec::with_capacity(active_tables.len());
        let mut tables_failed = 0usize;
        let mut done = 0u64;

        for table in &active_tables {
            match self.sync_one_table(table, full_sync).await {
                Ok(table) => reconciled.push(table),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tables_failed += 1;
                    error!(event = "table-sync-failed", table = %table.name, error = %e);
                }
            }
            done += 1;
            info!(progress = %render_progress(done, total));
        }

        let foreign_keys_created = match reconcile_foreign_keys(self.driver, self.store, db, &reconciled).await
        {
            Ok(fks) => fks.len(),
            Err(e) => {
                error!(event = "foreign-key-reconcile-failed", error = %e);
                0
            }
        };

        if let Err(e) = reconcile_metadata_table(self.driver, self.store, &self.config, db).await {
            error!(event = "metadata-table-reconcile-failed", error = %e);
        }

        Ok(SyncReport {
            tables_synced: reconciled.len(),
            tables_failed,
            foreign_keys_created,
        })
    }

    /// Steps 1-4 of C4 for one table, plus the analyze phase (C4 step 5 and
    /// the C2 pipeline). `full_sync = false` skips the row-count update and
    /// C2 steps 3-5, but C2 steps 1, 2, and 6 (nested-field reconciliation)
    /// still run — see [`classify_field`].
    async fn sync_one_table(&self, table: &Table, full_sync: bool) -> Result<Table> {
        let table = ensure_display_name(self.store, table).await?;
        reconcile_fields(self.driver, self.store, &table).await?;
        self.analyze_table(&table, full_sync).await?;
        Ok(table)
    }

    async fn analyze_table(&self, table: &Table, full_sync: bool) -> Result<()> {
        if full_sync {
            if let Some(rows) = self.store.table_row_count(table.id).await? {
                if Some(rows) != table.rows {
                    self.store
                        .update_table(
                            table.id,
                            TableUpdate {
                                rows: Some(rows),
                                ..Default::default()
                            },
                        )
                        .await?;
                }
            }
        }

        let fields = self.store.list_active_fields(table.id, None).await?;
        for field in fields {
            let field_name = field.name.clone();
            if let Err(e) =
                classify_field(self.driver, self.store, &self.config, field, full_sync).await
            {
                error!(event = "field-classify-failed", field = %field_name, error = %e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TracingEventBus;
    use crate::testing::FakeDriver;
    use syncer_store::{BaseType, DatabaseId, MemoryCatalogStore};

    fn db() -> Database {
        Database {
            id: DatabaseId(1),
            name: "warehouse".into(),
        }
    }

    #[tokio::test]
    async fn new_database_two_tables_end_to_end() {
        let driver = FakeDriver::builder()
            .table("users", None)
            .table("orders", None)
            .pk_field("users", "id", BaseType::IntegerField)
            .field("users", "email", BaseType::CharField)
            .field("users", "latitude", BaseType::FloatField)
            .pk_field("orders", "id", BaseType::IntegerField)
            .field("orders", "user_id", BaseType::IntegerField)
            .fk("orders", "user_id", "users", None, "id")
            .build();
        let store = MemoryCatalogStore::new();
        let events = TracingEventBus;
        let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

        let report = orchestrator.sync_database(&db(), true).await.unwrap();
        assert_eq!(report.tables_synced, 2);
        assert_eq!(report.tables_failed, 0);
        assert_eq!(report.foreign_keys_created, 1);

        let tables = store.list_active_tables(db().id).await.unwrap();
        assert_eq!(tables.len(), 2);

        let users = tables.iter().find(|t| t.name == "users").unwrap();
        let fields = store.list_active_fields(users.id, None).await.unwrap();
        assert_eq!(fields.len(), 3);
    }

    #[tokio::test]
    async fn idempotent_second_run_creates_no_new_tables_or_fields() {
        let driver = FakeDriver::builder()
            .table("users", None)
            .pk_field("users", "id", BaseType::IntegerField)
            .build();
        let store = MemoryCatalogStore::new();
        let events = TracingEventBus;
        let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

        orchestrator.sync_database(&db(), true).await.unwrap();
        let report = orchestrator.sync_database(&db(), true).await.unwrap();
        assert_eq!(report.tables_synced, 1);

        let tables = store.list_active_tables(db().id).await.unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn driver_contract_violation_aborts_the_whole_run() {
        let driver = FakeDriver::builder()
            .table("users", None)
            .table("orders", None)
            .pk_field("users", "id", BaseType::IntegerField)
            .field("orders", "", BaseType::CharField)
            .build();
        let store = MemoryCatalogStore::new();
        let events = TracingEventBus;
        let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

        let err = orchestrator.sync_database(&db(), true).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn non_full_sync_still_reconciles_nested_fields() {
        use std::collections::BTreeMap;

        let mut nested = BTreeMap::new();
        nested.insert("bio".to_string(), BaseType::TextField);

        let driver = FakeDriver::builder()
            .table("users", None)
            .pk_field("users", "id", BaseType::IntegerField)
            .field("users", "profile", BaseType::DictionaryField)
            .nested("profile", nested)
            .build();
        let store = MemoryCatalogStore::new();
        let events = TracingEventBus;
        let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

        orchestrator.sync_database(&db(), false).await.unwrap();

        let tables = store.list_active_tables(db().id).await.unwrap();
        let users = tables.iter().find(|t| t.name == "users").unwrap();
        let top_level = store.list_active_fields(users.id, None).await.unwrap();
        let profile = top_level.iter().find(|f| f.name == "profile").unwrap();
        let children = store
            .list_active_fields(users.id, Some(profile.id))
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "bio");
    }
}
