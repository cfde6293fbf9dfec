//! Syncer Store: the catalog domain model, the `CatalogStore` trait
//! surface, and an in-memory reference implementation.
//!
//! This crate has no opinion on *how* the catalog reconciles with an
//! external schema — that's `syncer-core`. It only defines what the catalog
//! looks like and how to read and write it.

pub mod catalog_store;
pub mod error;
pub mod fakes;
pub mod model;

pub use catalog_store::{CatalogStore, FieldUpdate, NewField, NewForeignKey, NewTable, TableUpdate};
pub use error::{StorageError, StorageResult};
pub use fakes::MemoryCatalogStore;
pub use model::{
    BaseType, Database, DatabaseId, Field, FieldId, ForeignKey, Relationship, SpecialType, Table,
    TableId,
};
