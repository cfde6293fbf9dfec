//! Syncer Core: the database introspection and metadata-inference engine.
//!
//! Given a registered external data source and a [`driver::Driver`] capable
//! of describing it, the Syncer brings an application's catalog of tables,
//! fields, foreign keys, and semantic annotations into agreement with the
//! external schema. See [`orchestrator::SyncOrchestrator`] for the entry
//! point that drives a full run.

pub mod classifiers;
pub mod config;
pub mod domain;
pub mod driver;
pub mod events;
pub mod inference;
pub mod orchestrator;
pub mod progress;
pub mod reconcile;
pub mod telemetry;
pub mod testing;

pub use config::SyncConfig;
pub use domain::{Result, SyncError};
pub use driver::{Capability, Driver};
pub use events::{EventBus, SyncEvent, TracingEventBus};
pub use orchestrator::{SyncOrchestrator, SyncReport};
pub use telemetry::init_tracing;

/// Syncer version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
