//! Domain re-exports and the engine's own error taxonomy.
//!
//! The catalog entities (`Database`, `Table`, `Field`, `ForeignKey`,
//! `BaseType`, `SpecialType`) live in `syncer-store`; this module re-exports
//! them alongside `SyncError`, the error type the Syncer itself raises.

pub mod error;

pub use error::{Result, SyncError};
pub use syncer_store::{
    BaseType, Database, DatabaseId, Field, FieldId, ForeignKey, Relationship, SpecialType, Table,
    TableId,
};
