//! Catalog entities: `Database`, `Table`, `Field`, `ForeignKey`, and the
//! closed `BaseType` / `SpecialType` enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(DatabaseId);
id_newtype!(TableId);
id_newtype!(FieldId);

/// Physical column type reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BaseType {
    BooleanField,
    BigIntegerField,
    IntegerField,
    DecimalField,
    FloatField,
    CharField,
    TextField,
    DateField,
    DateTimeField,
    TimeField,
    DictionaryField,
    UnknownField,
}

impl BaseType {
    /// Whether this type is driver-sampled as free text (`CharField`/`TextField`).
    pub fn is_textual(self) -> bool {
        matches!(self, BaseType::CharField | BaseType::TextField)
    }

    /// Whether this type stores floating-point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, BaseType::FloatField | BaseType::DecimalField)
    }

    /// Whether this type is any integral numeric type.
    pub fn is_integer(self) -> bool {
        matches!(self, BaseType::IntegerField | BaseType::BigIntegerField)
    }

    /// Whether this type is a boolean.
    pub fn is_boolean(self) -> bool {
        matches!(self, BaseType::BooleanField)
    }
}

/// Inferred semantic role of a column, independent of its storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialType {
    Id,
    Fk,
    Category,
    Url,
    Json,
    Name,
    Latitude,
    Longitude,
    City,
    State,
    Country,
    ZipCode,
}

/// Read-only external source; the Syncer never writes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub name: String,
}

/// A table (or view) in the external schema, mirrored into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub db_id: DatabaseId,
    pub schema: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
    pub active: bool,
    pub rows: Option<u64>,
    pub description: Option<String>,
    pub caveats: Option<String>,
    pub points_of_interest: Option<String>,
    pub entity_type: Option<String>,
    pub show_in_getting_started: bool,
}

impl Table {
    /// The `(schema, name)` pair, case-preserved, used as the natural key
    /// within a database. Missing schema is its own distinct key, never
    /// conflated with any present schema value.
    pub fn natural_key(&self) -> (Option<&str>, &str) {
        (self.schema.as_deref(), self.name.as_str())
    }
}

/// A column. Top-level fields have `parent_id = None`; fields nested under a
/// `DictionaryField` column reference their enclosing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub table_id: TableId,
    pub parent_id: Option<FieldId>,
    pub name: String,
    pub base_type: BaseType,
    pub special_type: Option<SpecialType>,
    pub display_name: Option<String>,
    pub preview_display: bool,
    pub active: bool,
    pub description: Option<String>,
}

impl Field {
    /// `true` once classification has determined the column holds JSON
    /// object/array payloads rather than scalars.
    pub fn is_json(&self) -> bool {
        self.special_type == Some(SpecialType::Json)
    }
}

/// `ManyToOne` is the default and only relationship the reconciler produces;
/// `OneToOne` detection exists as a documented extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    ManyToOne,
    OneToOne,
}

/// A resolved foreign-key edge: `origin_field` references `destination_field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub origin_field_id: FieldId,
    pub destination_field_id: FieldId,
    pub relationship: Relationship,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_key_distinguishes_missing_from_present_schema() {
        let no_schema = Table {
            id: TableId(1),
            db_id: DatabaseId(1),
            schema: None,
            name: "users".into(),
            display_name: None,
            active: true,
            rows: None,
            description: None,
            caveats: None,
            points_of_interest: None,
            entity_type: None,
            show_in_getting_started: false,
        };
        let with_schema = Table {
            schema: Some("public".into()),
            ..no_schema.clone()
        };
        assert_ne!(no_schema.natural_key(), with_schema.natural_key());
    }

    #[test]
    fn is_json_reflects_special_type() {
        let mut field = Field {
            id: FieldId(1),
            table_id: TableId(1),
            parent_id: None,
            name: "payload".into(),
            base_type: BaseType::TextField,
            special_type: None,
            display_name: None,
            preview_display: true,
            active: true,
            description: None,
        };
        assert!(!field.is_json());
        field.special_type = Some(SpecialType::Json);
        assert!(field.is_json());
    }

    #[test]
    fn base_type_gating_predicates() {
        assert!(BaseType::CharField.is_textual());
        assert!(BaseType::TextField.is_textual());
        assert!(!BaseType::IntegerField.is_textual());
        assert!(BaseType::FloatField.is_float());
        assert!(BaseType::IntegerField.is_integer());
        assert!(BaseType::BooleanField.is_boolean());
    }
}
