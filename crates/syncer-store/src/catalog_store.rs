//! The `CatalogStore` trait: CRUD surface over `Table`, `Field`, and
//! `ForeignKey` records, plus the small set of derived queries the Syncer
//! needs (distinct counts, row counts, field-values refresh, human-readable
//! names).
//!
//! The source system models writes as `insert`/`update` over a dynamic
//! entity + attribute map; here each entity gets its own typed insert and a
//! patch struct whose fields are an explicit allow-list, so an unknown
//! property is a compile error rather than a logged runtime rejection.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::model::{
    BaseType, DatabaseId, Field, FieldId, ForeignKey, Relationship, SpecialType, Table, TableId,
};

/// Attributes for a newly-discovered table.
#[derive(Debug, Clone)]
pub struct NewTable {
    pub db_id: DatabaseId,
    pub schema: Option<String>,
    pub name: String,
}

/// Patch applied to an existing table. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TableUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub rows: Option<u64>,
    pub caveats: Option<String>,
    pub points_of_interest: Option<String>,
    pub entity_type: Option<String>,
    pub show_in_getting_started: Option<bool>,
}

/// Attributes for a newly-discovered field.
#[derive(Debug, Clone)]
pub struct NewField {
    pub table_id: TableId,
    pub parent_id: Option<FieldId>,
    pub name: String,
    pub base_type: BaseType,
    pub special_type: Option<SpecialType>,
    pub display_name: Option<String>,
}

/// Patch applied to an existing field. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FieldUpdate {
    pub display_name: Option<String>,
    pub base_type: Option<BaseType>,
    pub special_type: Option<SpecialType>,
    pub preview_display: Option<bool>,
    pub active: Option<bool>,
    pub description: Option<String>,
}

/// Attributes for a newly-resolved foreign key.
#[derive(Debug, Clone)]
pub struct NewForeignKey {
    pub origin_field_id: FieldId,
    pub destination_field_id: FieldId,
    pub relationship: Relationship,
}

/// Catalog persistence surface consumed by the Syncer.
///
/// Implementations own the storage backend entirely; the Syncer treats every
/// method as a blocking I/O point and never assumes transactional isolation
/// across calls beyond what's documented per method.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Active tables for a database, in no particular order.
    async fn list_active_tables(&self, db_id: DatabaseId) -> StorageResult<Vec<Table>>;

    /// Look up one table by its natural key, active or not.
    async fn find_table(
        &self,
        db_id: DatabaseId,
        schema: Option<&str>,
        name: &str,
    ) -> StorageResult<Option<Table>>;

    /// Look up a table by name alone, ignoring schema. Used by the metadata
    /// table interpreter, whose keypaths carry no schema component.
    async fn find_table_by_name(
        &self,
        db_id: DatabaseId,
        name: &str,
    ) -> StorageResult<Option<Table>>;

    async fn insert_table(&self, new: NewTable) -> StorageResult<Table>;

    async fn update_table(&self, id: TableId, patch: TableUpdate) -> StorageResult<Table>;

    /// Deactivate the given tables and, atomically, all of their fields.
    async fn deactivate_tables(&self, ids: &[TableId]) -> StorageResult<()>;

    /// Active fields of a table under the given parent (`None` = top-level).
    async fn list_active_fields(
        &self,
        table_id: TableId,
        parent_id: Option<FieldId>,
    ) -> StorageResult<Vec<Field>>;

    /// Look up one field by its natural key, active or not.
    async fn find_field(
        &self,
        table_id: TableId,
        parent_id: Option<FieldId>,
        name: &str,
    ) -> StorageResult<Option<Field>>;

    /// Look up a field by `(table_name, field_name)` within a database,
    /// ignoring parent nesting. Used by the metadata table interpreter.
    async fn find_field_by_table_name(
        &self,
        db_id: DatabaseId,
        table_name: &str,
        field_name: &str,
    ) -> StorageResult<Option<Field>>;

    async fn insert_field(&self, new: NewField) -> StorageResult<Field>;

    async fn update_field(&self, id: FieldId, patch: FieldUpdate) -> StorageResult<Field>;

    async fn deactivate_fields(&self, ids: &[FieldId]) -> StorageResult<()>;

    /// The foreign key with the given origin field, if one exists.
    async fn foreign_key_by_origin(
        &self,
        origin_field_id: FieldId,
    ) -> StorageResult<Option<ForeignKey>>;

    async fn insert_foreign_key(&self, new: NewForeignKey) -> StorageResult<ForeignKey>;

    /// Distinct non-null value count for a field, capped at `cap` (the
    /// implementation may stop counting once the cap is reached).
    async fn field_distinct_count(&self, field_id: FieldId, cap: u64) -> StorageResult<u64>;

    /// Current row count for a table, if known to the catalog.
    async fn table_row_count(&self, table_id: TableId) -> StorageResult<Option<u64>>;

    /// Whether a field already qualifies, by the store's own bookkeeping,
    /// as a field that should have a refreshed FieldValues cache.
    async fn field_should_have_field_values(&self, field_id: FieldId) -> StorageResult<bool>;

    /// Trigger (or no-op if unnecessary) a FieldValues cache refresh.
    async fn update_field_values(&self, field_id: FieldId) -> StorageResult<()>;

    /// Derive a human-readable display name from a raw column/table name,
    /// e.g. `"user_id"` -> `"User Id"`. Pure; no I/O.
    fn name_to_human_readable(&self, name: &str) -> String {
        name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
