//! The `Driver` capability surface: everything the Syncer requires from an
//! adapter to a specific external data source. Individual driver
//! implementations are out of scope for this crate — see
//! `crate::testing::FakeDriver` for the deterministic in-memory driver used
//! by this crate's own tests.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{BaseType, Database, Field, SyncError, Table};

/// Optional capabilities a driver may advertise via [`Driver::features`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `describe_table_fks` is implemented and meaningful.
    ForeignKeys,
    /// `active_nested_field_name_to_type` is implemented for `DictionaryField` columns.
    NestedFields,
}

/// One table reported by `describe_database`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedTable {
    pub name: String,
    pub schema: Option<String>,
}

/// The result of `describe_database`: the full set of currently-visible
/// tables. Required shape per the driver contract: every element has a
/// non-empty `name`.
#[derive(Debug, Clone, Default)]
pub struct DescribedDatabase {
    pub tables: Vec<DescribedTable>,
}

/// One column reported by `describe_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedField {
    pub name: String,
    pub base_type: BaseType,
    pub is_pk: bool,
}

/// The result of `describe_table`.
#[derive(Debug, Clone, Default)]
pub struct DescribedTableFields {
    pub fields: Vec<DescribedField>,
}

/// One foreign key reported by `describe_table_fks`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescribedForeignKey {
    pub fk_column_name: String,
    pub dest_table_name: String,
    pub dest_table_schema: Option<String>,
    pub dest_column_name: String,
}

/// A single row of the `_metabase_metadata` table: `keypath = value`.
#[derive(Debug, Clone)]
pub struct MetadataRow {
    pub keypath: String,
    pub value: Value,
}

/// Driver adapter between the Syncer and a specific external data source.
///
/// Every method is a blocking I/O point from the orchestrator's perspective:
/// calls are awaited sequentially, never spawned speculatively.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Scoped acquisition of driver resources (connection, transaction).
    /// The default implementation runs `body` with no extra scoping; drivers
    /// that need connection setup override this.
    async fn sync_in_context<F, Fut, T>(&self, _db: &Database, body: F) -> crate::domain::Result<T>
    where
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = crate::domain::Result<T>> + Send,
        T: Send,
    {
        body().await
    }

    /// List the currently visible tables.
    async fn describe_database(&self, db: &Database) -> Result<DescribedDatabase, SyncError>;

    /// Describe the columns of one table.
    async fn describe_table(&self, table: &Table) -> Result<DescribedTableFields, SyncError>;

    /// Describe foreign keys originating from one table. Only called if
    /// `features()` contains [`Capability::ForeignKeys`].
    async fn describe_table_fks(
        &self,
        table: &Table,
    ) -> Result<HashSet<DescribedForeignKey>, SyncError>;

    /// Fraction of non-null sampled values that look like a URL, in `[0, 1]`.
    async fn field_percent_urls(&self, field: &Field) -> Result<f64, SyncError>;

    /// Average length (in characters) of sampled non-null values.
    async fn field_avg_length(&self, field: &Field) -> Result<u64, SyncError>;

    /// Up to `limit` sampled values for JSON-shape classification. `None`
    /// entries represent null/blank samples.
    async fn field_values_sample(
        &self,
        field: &Field,
        limit: usize,
    ) -> Result<Vec<Option<String>>, SyncError>;

    /// Current child name -> base_type map for a `DictionaryField` column.
    /// Only called if `features()` contains [`Capability::NestedFields`].
    async fn active_nested_field_name_to_type(
        &self,
        field: &Field,
    ) -> Result<BTreeMap<String, BaseType>, SyncError>;

    /// Rows of the `_metabase_metadata` table, if the driver supports
    /// streaming arbitrary tables by name. `None` if unsupported.
    async fn table_rows_seq(
        &self,
        db: &Database,
        table_name: &str,
    ) -> Result<Option<Vec<MetadataRow>>, SyncError>;

    /// Capabilities this driver advertises.
    fn features(&self) -> HashSet<Capability>;

    /// Optional driver-specific annotation hook, run first in the
    /// classifier pipeline. Returns a replacement field view, or `None` if
    /// the driver has nothing to add.
    async fn driver_specific_sync_field(
        &self,
        field: &Field,
    ) -> Result<Option<Field>, SyncError> {
        let _ = field;
        Ok(None)
    }
}
