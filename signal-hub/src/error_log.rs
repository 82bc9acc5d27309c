//! Best-effort error logging.
//!
//! `record` never fails and never blocks the caller. The SQLite sink writes to
//! `debug_logs` on a blocking task; if that write fails, the failure is only
//! traced.

use chrono::Utc;
use rusqlite::params;
use tracing::{debug, error, warn};

use crate::error::StorageError;
use crate::store::SqlitePool;

pub trait ErrorLogger: Send + Sync {
    /// Fire-and-forget. Implementations swallow their own failures.
    fn record(&self, context: &str, error: &(dyn std::error::Error + Send + Sync), details: &str);
}

/// Logs to the tracing subscriber only
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn record(&self, context: &str, error: &(dyn std::error::Error + Send + Sync), details: &str) {
        error!(context, details, "❌ {}", error);
    }
}

/// Persists errors to the `debug_logs` table
#[derive(Clone)]
pub struct SqliteErrorLogger {
    pool: SqlitePool,
}

impl SqliteErrorLogger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Synchronous insert, used by `record` on a blocking task
    pub fn write(&self, context: &str, message: &str, details: &str) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO debug_logs (timestamp, context, error_message, details) VALUES (?1, ?2, ?3, ?4)",
            params![Utc::now().timestamp_millis(), context, message, details],
        )?;
        Ok(())
    }
}

impl ErrorLogger for SqliteErrorLogger {
    fn record(&self, context: &str, error: &(dyn std::error::Error + Send + Sync), details: &str) {
        error!(context, "❌ {}", error);

        let logger = self.clone();
        let context = context.to_string();
        let message = error.to_string();
        let details = details.to_string();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available, debug log for {} not persisted", context);
            return;
        };

        runtime.spawn_blocking(move || match logger.write(&context, &message, &details) {
            Ok(()) => debug!("Error logged to database ({})", context),
            Err(e) => warn!("Failed to log error to database: {}", e),
        });
    }
}
