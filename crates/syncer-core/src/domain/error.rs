//! Error taxonomy for the Syncer.
//!
//! Mirrors the three failure classes from the design: a contract violation
//! from a driver is fatal to the whole run, a per-unit failure is caught and
//! logged by the orchestrator without aborting the run, and an inference
//! table misconfiguration is fatal at startup. `DataClassificationDisqualification`
//! is not represented as an error at all — classifiers simply return `Ok`
//! with no change when their preconditions aren't met.

use thiserror::Error;

/// Errors raised by the Syncer itself (not by a `Driver` or `CatalogStore`
/// implementation, which surface their own error types via `#[from]`).
#[derive(Debug, Error)]
pub enum SyncError {
    /// A driver returned structurally invalid data from `describe_database`,
    /// `describe_table`, or `describe_table_fks`. Fatal: aborts the run.
    #[error("driver contract violation: {0}")]
    DriverContractViolation(String),

    /// The special-type inference pattern table failed self-validation.
    /// Fatal at startup: the engine refuses to run.
    #[error("inference table misconfigured: {0}")]
    InferenceTableMisconfiguration(String),

    /// A single table, field, metadata row, or classifier stage failed.
    /// Recovered: logged at error severity, the unit is skipped.
    #[error("per-unit failure syncing {unit}: {source}")]
    PerUnitFailure {
        unit: String,
        #[source]
        source: Box<SyncError>,
    },

    /// Propagated from the catalog store backing the sync.
    #[error("storage error: {0}")]
    Storage(#[from] syncer_store::StorageError),

    /// Propagated from the driver backing the sync.
    #[error("driver error: {0}")]
    Driver(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Wrap `self` as a per-unit failure tagged with the unit's description,
    /// for isolation points in the orchestrator (per-table, per-field, ...).
    pub fn into_per_unit(self, unit: impl Into<String>) -> SyncError {
        SyncError::PerUnitFailure {
            unit: unit.into(),
            source: Box::new(self),
        }
    }

    /// `true` for error classes that must abort the whole sync run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::DriverContractViolation(_) | SyncError::InferenceTableMisconfiguration(_)
        )
    }
}

/// Result type for Syncer operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_contract_violation_is_fatal() {
        let err = SyncError::DriverContractViolation("missing name".into());
        assert!(err.is_fatal());
    }

    #[test]
    fn per_unit_failure_is_not_fatal() {
        let inner = SyncError::Driver("timeout".into());
        let err = inner.into_per_unit("table users");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("table users"));
    }

    #[test]
    fn inference_table_misconfiguration_is_fatal() {
        let err = SyncError::InferenceTableMisconfiguration("bad regex".into());
        assert!(err.is_fatal());
    }
}
