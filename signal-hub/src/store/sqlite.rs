use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::SignalStore;
use crate::config::DatabaseConfig;
use crate::error::StorageError;
use crate::types::{NewSignal, Signal, SourceKind};

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

const SELECT_SIGNALS: &str = r#"
    SELECT id, date, symbol, indicator_type, reason, time, capital_deployed_cr, created_at
    FROM signals
    WHERE date = ?1 AND indicator_type = ?2
"#;

/// SQLite-backed signal store over a shared connection pool
#[derive(Clone)]
pub struct SqliteSignalStore {
    pool: SqlitePool,
}

impl SqliteSignalStore {
    pub fn open<P: AsRef<Path>>(path: P, wal_mode: bool, pool_size: u32) -> Result<Self> {
        let pool = open_pool(path, wal_mode, pool_size)?;
        Self::from_pool(pool)
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, config.wal_mode, config.pool_size)
    }

    pub fn from_pool(pool: SqlitePool) -> Result<Self> {
        let conn = pool.get().context("Failed to check out connection for schema setup")?;
        initialize_schema(&conn)?;
        Ok(Self { pool })
    }

    /// Handle to the underlying pool, shared with the error logger
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }
}

/// Build the process-wide connection pool. Initialized once, dropped at shutdown.
pub fn open_pool<P: AsRef<Path>>(path: P, wal_mode: bool, pool_size: u32) -> Result<SqlitePool> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context("Failed to create database directory")?;
        }
    }

    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(move |conn| {
        if wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }
        conn.busy_timeout(Duration::from_secs(5))
    });

    let pool = r2d2::Pool::builder()
        .max_size(pool_size.max(1))
        .build(manager)
        .context("Failed to build database connection pool")?;

    info!("✅ Database pool ready: {:?} (max {} connections)", path.as_ref(), pool_size.max(1));
    Ok(pool)
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Signals table (append-only)
        CREATE TABLE IF NOT EXISTS signals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            symbol TEXT NOT NULL,
            indicator_type TEXT CHECK(indicator_type IN ('Indicator1', 'Indicator2')) NOT NULL,
            reason TEXT NOT NULL,
            time TEXT NOT NULL,
            capital_deployed_cr REAL,
            created_at INTEGER NOT NULL
        );

        -- Debug logs table (best-effort error sink)
        CREATE TABLE IF NOT EXISTS debug_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            context TEXT NOT NULL,
            error_message TEXT NOT NULL,
            details TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_signals_date_type_created ON signals(date, indicator_type, created_at);
        CREATE INDEX IF NOT EXISTS idx_signals_date_symbol ON signals(date, symbol);
        "#,
    )
    .context("Failed to initialize database schema")?;

    debug!("📊 Database schema initialized");
    Ok(())
}

/// Row as stored, before conversion to domain types
struct SignalRow {
    id: i64,
    date: String,
    symbol: String,
    indicator_type: String,
    reason: String,
    time: String,
    capital: Option<f64>,
    created_at_ms: i64,
}

impl TryFrom<SignalRow> for Signal {
    type Error = StorageError;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| StorageError::Corrupt(format!("id {}: date {:?}: {}", row.id, row.date, e)))?;
        let time = NaiveTime::parse_from_str(&row.time, TIME_FORMAT)
            .map_err(|e| StorageError::Corrupt(format!("id {}: time {:?}: {}", row.id, row.time, e)))?;
        let source = SourceKind::parse(&row.indicator_type).ok_or_else(|| {
            StorageError::Corrupt(format!("id {}: indicator_type {:?}", row.id, row.indicator_type))
        })?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(row.created_at_ms).ok_or_else(|| {
            StorageError::Corrupt(format!("id {}: created_at {}", row.id, row.created_at_ms))
        })?;

        Ok(Signal {
            id: row.id,
            date,
            symbol: row.symbol,
            source,
            reason: row.reason,
            time,
            capital: row.capital,
            created_at,
        })
    }
}

fn insert_blocking(pool: &SqlitePool, signal: &NewSignal) -> Result<i64, StorageError> {
    let conn = pool.get()?;
    conn.execute(
        r#"
        INSERT INTO signals (
            date, symbol, indicator_type, reason, time, capital_deployed_cr, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            signal.date.format(DATE_FORMAT).to_string(),
            signal.symbol,
            signal.source.as_str(),
            signal.reason,
            signal.time.format(TIME_FORMAT).to_string(),
            signal.capital,
            signal.created_at.timestamp_millis(),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn query_blocking(pool: &SqlitePool, sql: &str, args: &[String]) -> Result<Vec<Signal>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok(SignalRow {
                id: row.get(0)?,
                date: row.get(1)?,
                symbol: row.get(2)?,
                indicator_type: row.get(3)?,
                reason: row.get(4)?,
                time: row.get(5)?,
                capital: row.get(6)?,
                created_at_ms: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Signal::try_from).collect()
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn insert_signal(&self, signal: &NewSignal) -> Result<i64, StorageError> {
        let pool = self.pool.clone();
        let signal = signal.clone();

        let id = tokio::task::spawn_blocking(move || insert_blocking(&pool, &signal)).await??;

        debug!("Inserted signal {}", id);
        Ok(id)
    }

    async fn query_signals(
        &self,
        date: NaiveDate,
        source: SourceKind,
        symbols: Option<&[String]>,
    ) -> Result<Vec<Signal>, StorageError> {
        let mut sql = SELECT_SIGNALS.to_string();
        let mut args = vec![date.format(DATE_FORMAT).to_string(), source.as_str().to_string()];

        if let Some(symbols) = symbols {
            if symbols.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders: Vec<String> = (0..symbols.len()).map(|i| format!("?{}", i + 3)).collect();
            sql.push_str(&format!("  AND symbol IN ({})\n", placeholders.join(", ")));
            args.extend(symbols.iter().cloned());
        }
        sql.push_str("ORDER BY created_at DESC, id DESC");

        let pool = self.pool.clone();
        let signals = tokio::task::spawn_blocking(move || query_blocking(&pool, &sql, &args)).await??;

        debug!("Fetched {} {} signals for {}", signals.len(), source, date);
        Ok(signals)
    }
}
