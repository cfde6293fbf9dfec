//! The Event Bus: fire-and-forget publication of sync lifecycle events.
//!
//! The bus is out of scope as a collaborator (the product owns the real
//! transport), so this module only defines the event shapes and a
//! tracing-backed implementation suitable for the demo CLI and tests.

use tracing::info;
use uuid::Uuid;

use crate::domain::{DatabaseId, TableId};

/// One lifecycle event published during a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Published once, before any reconciliation work begins.
    DatabaseSyncBegin {
        database_id: DatabaseId,
        custom_id: Uuid,
    },
    /// Published once, after the full database sync completes (including
    /// when some tables suffered a recovered per-unit failure).
    DatabaseSyncEnd {
        database_id: DatabaseId,
        custom_id: Uuid,
        running_time_ms: u64,
    },
    /// Published after a single-table sync (`syncTable`, outside a full
    /// database sync).
    TableSync { table_id: TableId },
}

/// Fire-and-forget event publication. Implementations must not block the
/// orchestrator or propagate errors back into the sync run.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: SyncEvent);
}

/// Publishes every event as a structured `tracing` record at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn publish(&self, event: SyncEvent) {
        match event {
            SyncEvent::DatabaseSyncBegin {
                database_id,
                custom_id,
            } => info!(
                event = "database-sync-begin",
                database_id = %database_id,
                custom_id = %custom_id,
            ),
            SyncEvent::DatabaseSyncEnd {
                database_id,
                custom_id,
                running_time_ms,
            } => info!(
                event = "database-sync-end",
                database_id = %database_id,
                custom_id = %custom_id,
                running_time_ms = running_time_ms,
            ),
            SyncEvent::TableSync { table_id } => {
                info!(event = "table-sync", table_id = %table_id)
            }
        }
    }
}

/// RAII guard that enters a tracing span scoped to one database sync run,
/// tagging every log line emitted while the guard is alive.
pub struct SyncSpan {
    _span: tracing::span::EnteredSpan,
}

impl SyncSpan {
    pub fn enter(database_id: DatabaseId, custom_id: Uuid) -> Self {
        let span = tracing::info_span!(
            "syncer.database_sync",
            database_id = %database_id,
            custom_id = %custom_id,
        );
        Self {
            _span: span.entered(),
        }
    }
}
