//! The reconciliation passes (C3-C6), each a standalone function over a
//! `Driver` and a `CatalogStore`. The orchestrator (`crate::orchestrator`)
//! sequences them in the order required by their data dependencies.

pub mod fields;
pub mod foreign_keys;
pub mod metadata;
pub mod tables;

pub use fields::{ensure_display_name, reconcile_fields};
pub use foreign_keys::reconcile_foreign_keys;
pub use metadata::reconcile_metadata_table;
pub use tables::reconcile_tables;
