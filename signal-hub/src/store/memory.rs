//! In-process signal store.
//!
//! Same ordering contract as the SQLite store. Counts queries so callers can
//! check whether a read actually reached storage, and can be switched into a
//! failing mode to exercise error paths.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::SignalStore;
use crate::error::StorageError;
use crate::types::{NewSignal, Signal, SourceKind};

#[derive(Default)]
pub struct MemorySignalStore {
    signals: Mutex<Vec<Signal>>,
    queries: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `query_signals` calls served or refused so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.signals.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn insert_signal(&self, signal: &NewSignal) -> Result<i64, StorageError> {
        self.check_available()?;

        let mut signals = self.signals.lock().map_err(poisoned)?;
        let id = signals.len() as i64 + 1;
        signals.push(signal.clone().with_id(id));
        Ok(id)
    }

    async fn query_signals(
        &self,
        date: NaiveDate,
        source: SourceKind,
        symbols: Option<&[String]>,
    ) -> Result<Vec<Signal>, StorageError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let signals = self.signals.lock().map_err(poisoned)?;
        let mut matched: Vec<Signal> = signals
            .iter()
            .filter(|s| s.date == date && s.source == source)
            .filter(|s| symbols.map_or(true, |allow| allow.iter().any(|sym| *sym == s.symbol)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(matched)
    }
}
