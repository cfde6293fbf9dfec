//! Syncer CLI
//!
//! A command-line harness for the database introspection and
//! metadata-inference engine. Since this crate ships no live `Driver`
//! adapter, commands read a JSON schema fixture describing the external
//! source and sync it against a fresh in-memory catalog.
//!
//! ## Commands
//!
//! - `sync`: run a full or incremental sync against a schema fixture
//! - `inspect`: sync, then dump the resulting catalog as JSON

mod fixture;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use syncer_core::{SyncConfig, SyncOrchestrator, TracingEventBus};
use syncer_store::{Database, DatabaseId, MemoryCatalogStore};

use fixture::SchemaFixture;

#[derive(Parser)]
#[command(name = "syncer")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Database introspection and metadata-inference engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a catalog against a schema fixture file
    Sync {
        /// Path to a JSON schema fixture
        schema: PathBuf,

        /// Run the analyze phase too (classifiers, row counts)
        #[arg(long)]
        full: bool,
    },

    /// Sync a schema fixture, then dump the resulting catalog as JSON
    Inspect {
        /// Path to a JSON schema fixture
        schema: PathBuf,

        /// Run the analyze phase too (classifiers, row counts)
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    syncer_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Sync { schema, full } => cmd_sync(&schema, full).await,
        Commands::Inspect { schema, full } => cmd_inspect(&schema, full).await,
    }
}

async fn cmd_sync(schema_path: &PathBuf, full: bool) -> Result<()> {
    let (db, driver, store) = load_fixture(schema_path)?;
    let events = TracingEventBus;
    let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

    let report = orchestrator
        .sync_database(&db, full)
        .await
        .context("sync run failed")?;

    println!("{}", serde_json::to_string_pretty(&report_view(&report))?);
    Ok(())
}

async fn cmd_inspect(schema_path: &PathBuf, full: bool) -> Result<()> {
    let (db, driver, store) = load_fixture(schema_path)?;
    let events = TracingEventBus;
    let orchestrator = SyncOrchestrator::new(&driver, &store, &events, SyncConfig::default());

    orchestrator
        .sync_database(&db, full)
        .await
        .context("sync run failed")?;

    let tables = store
        .list_active_tables(db.id)
        .await
        .context("listing synced tables")?;

    let mut views = Vec::with_capacity(tables.len());
    for table in tables {
        let fields = store
            .list_active_fields(table.id, None)
            .await
            .with_context(|| format!("listing fields for table {}", table.name))?;
        views.push(TableView { table, fields });
    }
    views.sort_by(|a, b| a.table.name.cmp(&b.table.name));

    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

fn load_fixture(
    path: &PathBuf,
) -> Result<(Database, syncer_core::testing::FakeDriver, MemoryCatalogStore)> {
    let fixture = SchemaFixture::load(path)?;
    let db = Database {
        id: DatabaseId(1),
        name: fixture.database.clone(),
    };
    let driver = fixture.into_driver();
    let store = MemoryCatalogStore::new();
    Ok((db, driver, store))
}

#[derive(Serialize)]
struct ReportView {
    tables_synced: usize,
    tables_failed: usize,
    foreign_keys_created: usize,
}

fn report_view(report: &syncer_core::SyncReport) -> ReportView {
    ReportView {
        tables_synced: report.tables_synced,
        tables_failed: report.tables_failed,
        foreign_keys_created: report.foreign_keys_created,
    }
}

#[derive(Serialize)]
struct TableView {
    table: syncer_store::Table,
    fields: Vec<syncer_store::Field>,
}
