// Signal Hub - alert ingestion and correlated dashboard
// Two alert providers post signals; reads get a cached, cross-referenced view of the day

pub mod cache;
pub mod categorizer;
pub mod classifier;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod error;
pub mod error_log;
pub mod ingest;
pub mod logging;
pub mod server;
pub mod store;
pub mod types;

pub use dashboard::{CachedDashboard, DashboardAggregator, DashboardView};
pub use error::{CacheError, IngestError, StorageError, ValidationError};
pub use ingest::SignalIngestor;
pub use store::{SignalStore, SqliteSignalStore};
