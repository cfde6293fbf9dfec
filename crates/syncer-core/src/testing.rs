//! `FakeDriver`: a deterministic, in-memory `Driver` used by this crate's own
//! tests (and available to downstream crates for theirs). Configuration is
//! keyed by field name rather than `(table, field)` pairs — a deliberate
//! simplification for a test double, not a constraint the real `Driver`
//! contract imposes.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use syncer_store::{BaseType, Database, Field, Table};

use crate::domain::Result;
use crate::driver::{
    Capability, DescribedDatabase, DescribedField, DescribedForeignKey, DescribedTable,
    DescribedTableFields, Driver, MetadataRow,
};

/// A deterministic `Driver` built up via [`FakeDriverBuilder`].
#[derive(Debug, Default, Clone)]
pub struct FakeDriver {
    tables: Vec<DescribedTable>,
    fields_by_table: HashMap<String, Vec<DescribedField>>,
    fks_by_table: HashMap<String, HashSet<DescribedForeignKey>>,
    percent_urls: HashMap<String, f64>,
    avg_lengths: HashMap<String, u64>,
    samples: HashMap<String, Vec<Option<String>>>,
    nested: HashMap<String, BTreeMap<String, BaseType>>,
    metadata_rows: Option<Vec<MetadataRow>>,
    capabilities: HashSet<Capability>,
}

impl FakeDriver {
    pub fn builder() -> FakeDriverBuilder {
        FakeDriverBuilder::default()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn describe_database(&self, _db: &Database) -> Result<DescribedDatabase> {
        Ok(DescribedDatabase {
            tables: self.tables.clone(),
        })
    }

    async fn describe_table(&self, table: &Table) -> Result<DescribedTableFields> {
        Ok(DescribedTableFields {
            fields: self.fields_by_table.get(&table.name).cloned().unwrap_or_default(),
        })
    }

    async fn describe_table_fks(&self, table: &Table) -> Result<HashSet<DescribedForeignKey>> {
        Ok(self.fks_by_table.get(&table.name).cloned().unwrap_or_default())
    }

    async fn field_percent_urls(&self, field: &Field) -> Result<f64> {
        Ok(*self.percent_urls.get(&field.name).unwrap_or(&0.0))
    }

    async fn field_avg_length(&self, field: &Field) -> Result<u64> {
        Ok(*self.avg_lengths.get(&field.name).unwrap_or(&0))
    }

    async fn field_values_sample(
        &self,
        field: &Field,
        limit: usize,
    ) -> Result<Vec<Option<String>>> {
        let mut samples = self.samples.get(&field.name).cloned().unwrap_or_default();
        samples.truncate(limit);
        Ok(samples)
    }

    async fn active_nested_field_name_to_type(
        &self,
        field: &Field,
    ) -> Result<BTreeMap<String, BaseType>> {
        Ok(self.nested.get(&field.name).cloned().unwrap_or_default())
    }

    async fn table_rows_seq(
        &self,
        _db: &Database,
        _table_name: &str,
    ) -> Result<Option<Vec<MetadataRow>>> {
        Ok(self.metadata_rows.clone())
    }

    fn features(&self) -> HashSet<Capability> {
        self.capabilities.clone()
    }
}

/// Builder for [`FakeDriver`]. Every setter consumes and returns `self` for
/// chaining.
#[derive(Debug, Default)]
pub struct FakeDriverBuilder {
    inner: FakeDriver,
}

impl FakeDriverBuilder {
    pub fn table(mut self, name: &str, schema: Option<&str>) -> Self {
        self.inner.tables.push(DescribedTable {
            name: name.to_string(),
            schema: schema.map(str::to_string),
        });
        self
    }

    pub fn field(mut self, table: &str, name: &str, base_type: BaseType) -> Self {
        self.inner
            .fields_by_table
            .entry(table.to_string())
            .or_default()
            .push(DescribedField {
                name: name.to_string(),
                base_type,
                is_pk: false,
            });
        self
    }

    pub fn pk_field(mut self, table: &str, name: &str, base_type: BaseType) -> Self {
        self.inner
            .fields_by_table
            .entry(table.to_string())
            .or_default()
            .push(DescribedField {
                name: name.to_string(),
                base_type,
                is_pk: true,
            });
        self
    }

    pub fn fk(
        mut self,
        table: &str,
        fk_column_name: &str,
        dest_table_name: &str,
        dest_table_schema: Option<&str>,
        dest_column_name: &str,
    ) -> Self {
        self.inner
            .fks_by_table
            .entry(table.to_string())
            .or_default()
            .insert(DescribedForeignKey {
                fk_column_name: fk_column_name.to_string(),
                dest_table_name: dest_table_name.to_string(),
                dest_table_schema: dest_table_schema.map(str::to_string),
                dest_column_name: dest_column_name.to_string(),
            });
        self.inner.capabilities.insert(Capability::ForeignKeys);
        self
    }

    pub fn percent_urls(mut self, field: &str, value: f64) -> Self {
        self.inner.percent_urls.insert(field.to_string(), value);
        self
    }

    pub fn avg_length(mut self, field: &str, value: u64) -> Self {
        self.inner.avg_lengths.insert(field.to_string(), value);
        self
    }

    pub fn samples(mut self, field: &str, values: Vec<Option<String>>) -> Self {
        self.inner.samples.insert(field.to_string(), values);
        self
    }

    pub fn nested(mut self, field: &str, children: BTreeMap<String, BaseType>) -> Self {
        self.inner.nested.insert(field.to_string(), children);
        self.inner.capabilities.insert(Capability::NestedFields);
        self
    }

    pub fn metadata_rows(mut self, rows: Vec<MetadataRow>) -> Self {
        self.inner.metadata_rows = Some(rows);
        self
    }

    pub fn capability(mut self, cap: Capability) -> Self {
        self.inner.capabilities.insert(cap);
        self
    }

    pub fn build(self) -> FakeDriver {
        self.inner
    }
}
