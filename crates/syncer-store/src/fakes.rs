//! `MemoryCatalogStore`: an in-memory `CatalogStore` for tests and the demo
//! CLI. No external dependencies, no persistence across process restarts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog_store::{CatalogStore, FieldUpdate, NewField, NewForeignKey, NewTable, TableUpdate};
use crate::error::{StorageError, StorageResult};
use crate::model::{DatabaseId, Field, FieldId, ForeignKey, Table, TableId};

#[derive(Debug, Default)]
struct Counters {
    table: AtomicU64,
    field: AtomicU64,
}

impl Counters {
    fn next_table(&self) -> TableId {
        TableId(self.table.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_field(&self) -> FieldId {
        FieldId(self.field.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// In-memory catalog backed by `HashMap`s, guarded by a single `Mutex`.
///
/// Field-values "refresh" bookkeeping is tracked as a counter per field so
/// tests can assert a refresh happened without modelling the actual cache.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: Mutex<HashMap<TableId, Table>>,
    fields: Mutex<HashMap<FieldId, Field>>,
    foreign_keys: Mutex<Vec<ForeignKey>>,
    field_values_refreshes: Mutex<HashMap<FieldId, u64>>,
    distinct_counts: Mutex<HashMap<FieldId, u64>>,
    counters: Counters,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `update_field_values` has been called for a field.
    pub fn field_values_refresh_count(&self, field_id: FieldId) -> u64 {
        self.field_values_refreshes
            .lock()
            .unwrap()
            .get(&field_id)
            .copied()
            .unwrap_or(0)
    }

    /// Seed the distinct-value count `field_distinct_count` reports for a
    /// field. Defaults to 0 (no category inference) if never set.
    pub fn set_distinct_count(&self, field_id: FieldId, count: u64) {
        self.distinct_counts.lock().unwrap().insert(field_id, count);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_active_tables(&self, db_id: DatabaseId) -> StorageResult<Vec<Table>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .values()
            .filter(|t| t.db_id == db_id && t.active)
            .cloned()
            .collect())
    }

    async fn find_table(
        &self,
        db_id: DatabaseId,
        schema: Option<&str>,
        name: &str,
    ) -> StorageResult<Option<Table>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .values()
            .find(|t| t.db_id == db_id && t.schema.as_deref() == schema && t.name == name)
            .cloned())
    }

    async fn find_table_by_name(
        &self,
        db_id: DatabaseId,
        name: &str,
    ) -> StorageResult<Option<Table>> {
        let lower = name.to_lowercase();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .values()
            .find(|t| t.db_id == db_id && t.name.to_lowercase() == lower)
            .cloned())
    }

    async fn insert_table(&self, new: NewTable) -> StorageResult<Table> {
        let id = self.counters.next_table();
        let table = Table {
            id,
            db_id: new.db_id,
            schema: new.schema,
            name: new.name,
            display_name: None,
            active: true,
            rows: None,
            description: None,
            caveats: None,
            points_of_interest: None,
            entity_type: None,
            show_in_getting_started: false,
        };
        self.tables.lock().unwrap().insert(id, table.clone());
        Ok(table)
    }

    async fn update_table(&self, id: TableId, patch: TableUpdate) -> StorageResult<Table> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.get_mut(&id).ok_or_else(|| StorageError::NotFound {
            entity: "table".into(),
            id: id.to_string(),
        })?;
        if let Some(display_name) = patch.display_name {
            table.display_name = Some(display_name);
        }
        if let Some(description) = patch.description {
            table.description = Some(description);
        }
        if let Some(active) = patch.active {
            table.active = active;
        }
        if let Some(rows) = patch.rows {
            table.rows = Some(rows);
        }
        if let Some(caveats) = patch.caveats {
            table.caveats = Some(caveats);
        }
        if let Some(points_of_interest) = patch.points_of_interest {
            table.points_of_interest = Some(points_of_interest);
        }
        if let Some(entity_type) = patch.entity_type {
            table.entity_type = Some(entity_type);
        }
        if let Some(show_in_getting_started) = patch.show_in_getting_started {
            table.show_in_getting_started = show_in_getting_started;
        }
        Ok(table.clone())
    }

    async fn deactivate_tables(&self, ids: &[TableId]) -> StorageResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let mut fields = self.fields.lock().unwrap();
        for id in ids {
            if let Some(table) = tables.get_mut(id) {
                table.active = false;
            }
            for field in fields.values_mut() {
                if field.table_id == *id {
                    field.active = false;
                }
            }
        }
        Ok(())
    }

    async fn list_active_fields(
        &self,
        table_id: TableId,
        parent_id: Option<FieldId>,
    ) -> StorageResult<Vec<Field>> {
        let fields = self.fields.lock().unwrap();
        Ok(fields
            .values()
            .filter(|f| f.table_id == table_id && f.parent_id == parent_id && f.active)
            .cloned()
            .collect())
    }

    async fn find_field(
        &self,
        table_id: TableId,
        parent_id: Option<FieldId>,
        name: &str,
    ) -> StorageResult<Option<Field>> {
        let fields = self.fields.lock().unwrap();
        Ok(fields
            .values()
            .find(|f| f.table_id == table_id && f.parent_id == parent_id && f.name == name)
            .cloned())
    }

    async fn find_field_by_table_name(
        &self,
        db_id: DatabaseId,
        table_name: &str,
        field_name: &str,
    ) -> StorageResult<Option<Field>> {
        let lower_table = table_name.to_lowercase();
        let tables = self.tables.lock().unwrap();
        let Some(table) = tables
            .values()
            .find(|t| t.db_id == db_id && t.name.to_lowercase() == lower_table)
        else {
            return Ok(None);
        };
        let fields = self.fields.lock().unwrap();
        Ok(fields
            .values()
            .find(|f| f.table_id == table.id && f.parent_id.is_none() && f.name == field_name)
            .cloned())
    }

    async fn insert_field(&self, new: NewField) -> StorageResult<Field> {
        let id = self.counters.next_field();
        let field = Field {
            id,
            table_id: new.table_id,
            parent_id: new.parent_id,
            name: new.name,
            base_type: new.base_type,
            special_type: new.special_type,
            display_name: new.display_name,
            preview_display: true,
            active: true,
            description: None,
        };
        self.fields.lock().unwrap().insert(id, field.clone());
        Ok(field)
    }

    async fn update_field(&self, id: FieldId, patch: FieldUpdate) -> StorageResult<Field> {
        let mut fields = self.fields.lock().unwrap();
        let field = fields.get_mut(&id).ok_or_else(|| StorageError::NotFound {
            entity: "field".into(),
            id: id.to_string(),
        })?;
        if let Some(display_name) = patch.display_name {
            field.display_name = Some(display_name);
        }
        if let Some(base_type) = patch.base_type {
            field.base_type = base_type;
        }
        if let Some(special_type) = patch.special_type {
            field.special_type = Some(special_type);
        }
        if let Some(preview_display) = patch.preview_display {
            field.preview_display = preview_display;
        }
        if let Some(active) = patch.active {
            field.active = active;
        }
        if let Some(description) = patch.description {
            field.description = Some(description);
        }
        Ok(field.clone())
    }

    async fn deactivate_fields(&self, ids: &[FieldId]) -> StorageResult<()> {
        let mut fields = self.fields.lock().unwrap();
        for id in ids {
            if let Some(field) = fields.get_mut(id) {
                field.active = false;
            }
        }
        Ok(())
    }

    async fn foreign_key_by_origin(
        &self,
        origin_field_id: FieldId,
    ) -> StorageResult<Option<ForeignKey>> {
        let fks = self.foreign_keys.lock().unwrap();
        Ok(fks
            .iter()
            .find(|fk| fk.origin_field_id == origin_field_id)
            .cloned())
    }

    async fn insert_foreign_key(&self, new: NewForeignKey) -> StorageResult<ForeignKey> {
        let fk = ForeignKey {
            origin_field_id: new.origin_field_id,
            destination_field_id: new.destination_field_id,
            relationship: new.relationship,
        };
        self.foreign_keys.lock().unwrap().push(fk.clone());
        Ok(fk)
    }

    async fn field_distinct_count(&self, field_id: FieldId, cap: u64) -> StorageResult<u64> {
        let counts = self.distinct_counts.lock().unwrap();
        Ok(counts.get(&field_id).copied().unwrap_or(0).min(cap))
    }

    async fn table_row_count(&self, table_id: TableId) -> StorageResult<Option<u64>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(&table_id).and_then(|t| t.rows))
    }

    async fn field_should_have_field_values(&self, field_id: FieldId) -> StorageResult<bool> {
        let _ = field_id;
        Ok(false)
    }

    async fn update_field_values(&self, field_id: FieldId) -> StorageResult<()> {
        let mut refreshes = self.field_values_refreshes.lock().unwrap();
        *refreshes.entry(field_id).or_insert(0) += 1;
        Ok(())
    }
}
