//! JSON schema fixtures: a human-editable stand-in for a live external data
//! source, used by the `sync` and `inspect` commands since this crate ships
//! no real `Driver` adapter. Load one with [`SchemaFixture::load`] and turn
//! it into a [`FakeDriver`] with [`SchemaFixture::into_driver`].

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use syncer_core::testing::FakeDriver;
use syncer_store::BaseType;

#[derive(Debug, Deserialize)]
pub struct SchemaFixture {
    pub database: String,
    pub tables: Vec<TableFixture>,
    #[serde(default)]
    pub metadata_rows: Vec<MetadataRowFixture>,
}

#[derive(Debug, Deserialize)]
pub struct TableFixture {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldFixture>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyFixture>,
}

#[derive(Debug, Deserialize)]
pub struct FieldFixture {
    pub name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub is_pk: bool,
    #[serde(default)]
    pub percent_urls: Option<f64>,
    #[serde(default)]
    pub avg_length: Option<u64>,
    #[serde(default)]
    pub samples: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub nested: Option<BTreeMap<String, BaseType>>,
}

#[derive(Debug, Deserialize)]
pub struct ForeignKeyFixture {
    pub column: String,
    pub dest_table: String,
    #[serde(default)]
    pub dest_schema: Option<String>,
    pub dest_column: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRowFixture {
    pub keypath: String,
    pub value: serde_json::Value,
}

impl SchemaFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing schema fixture {}", path.display()))
    }

    pub fn into_driver(self) -> FakeDriver {
        let mut builder = FakeDriver::builder();
        for table in &self.tables {
            builder = builder.table(&table.name, table.schema.as_deref());
        }
        for table in self.tables {
            for field in table.fields {
                builder = if field.is_pk {
                    builder.pk_field(&table.name, &field.name, field.base_type)
                } else {
                    builder.field(&table.name, &field.name, field.base_type)
                };
                if let Some(pct) = field.percent_urls {
                    builder = builder.percent_urls(&field.name, pct);
                }
                if let Some(len) = field.avg_length {
                    builder = builder.avg_length(&field.name, len);
                }
                if let Some(samples) = field.samples {
                    builder = builder.samples(&field.name, samples);
                }
                if let Some(nested) = field.nested {
                    builder = builder.nested(&field.name, nested);
                }
            }
            for fk in table.foreign_keys {
                builder = builder.fk(
                    &table.name,
                    &fk.column,
                    &fk.dest_table,
                    fk.dest_schema.as_deref(),
                    &fk.dest_column,
                );
            }
        }
        if !self.metadata_rows.is_empty() {
            builder = builder.metadata_rows(
                self.metadata_rows
                    .into_iter()
                    .map(|row| syncer_core::driver::MetadataRow {
                        keypath: row.keypath,
                        value: row.value,
                    })
                    .collect(),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
        "database": "warehouse",
        "tables": [
            {
                "name": "users",
                "fields": [
                    {"name": "id", "base_type": "IntegerField", "is_pk": true},
                    {"name": "email", "base_type": "CharField"}
                ]
            },
            {
                "name": "orders",
                "fields": [
                    {"name": "id", "base_type": "IntegerField", "is_pk": true},
                    {"name": "user_id", "base_type": "IntegerField"}
                ],
                "foreign_keys": [
                    {"column": "user_id", "dest_table": "users", "dest_column": "id"}
                ]
            }
        ]
    }
    "#;

    #[test]
    fn parses_tables_fields_and_foreign_keys() {
        let fixture: SchemaFixture = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(fixture.database, "warehouse");
        assert_eq!(fixture.tables.len(), 2);
        let orders = fixture.tables.iter().find(|t| t.name == "orders").unwrap();
        assert_eq!(orders.foreign_keys.len(), 1);
    }

    #[tokio::test]
    async fn into_driver_builds_a_usable_fake_driver() {
        let fixture: SchemaFixture = serde_json::from_str(SAMPLE).unwrap();
        let driver = fixture.into_driver();
        let database = syncer_store::Database {
            id: syncer_store::DatabaseId(1),
            name: "warehouse".into(),
        };
        let described = syncer_core::driver::Driver::describe_database(&driver, &database)
            .await
            .unwrap();
        assert_eq!(described.tables.len(), 2);
    }
}
