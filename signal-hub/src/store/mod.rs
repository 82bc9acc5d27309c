pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StorageError;
use crate::types::{NewSignal, Signal, SourceKind};

pub use memory::MemorySignalStore;
pub use sqlite::{SqlitePool, SqliteSignalStore};

/// Typed access to persisted signals. No business logic lives here.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Append a signal, returning its store-assigned id
    async fn insert_signal(&self, signal: &NewSignal) -> Result<i64, StorageError>;

    /// Signals for one date and source, newest `created_at` first.
    ///
    /// `symbols` restricts the result to an allow-list when given.
    async fn query_signals(
        &self,
        date: NaiveDate,
        source: SourceKind,
        symbols: Option<&[String]>,
    ) -> Result<Vec<Signal>, StorageError>;
}
