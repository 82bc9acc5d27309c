//! End-to-end: webhook payloads through the SQLite store to the cached dashboard.

use serde_json::json;
use signal_hub::cache::MemoryCache;
use signal_hub::config::{CacheConfig, DashboardConfig};
use signal_hub::dashboard::{CacheStatus, CachedDashboard, DashboardAggregator};
use signal_hub::error_log::SqliteErrorLogger;
use signal_hub::ingest::SignalIngestor;
use signal_hub::store::SqliteSignalStore;
use signal_hub::types::{SourceKind, SyncStatus};
use signal_hub::{IngestError, ValidationError};
use std::sync::Arc;
use tempfile::tempdir;

struct Hub {
    ingestor: SignalIngestor,
    dashboard: CachedDashboard,
    _dir: tempfile::TempDir,
}

fn hub() -> Hub {
    let dir = tempdir().unwrap();
    let store = SqliteSignalStore::open(dir.path().join("signals.db"), true, 4).unwrap();
    let errors = Arc::new(SqliteErrorLogger::new(store.pool()));
    let store = Arc::new(store);

    let aggregator = DashboardAggregator::new(store.clone(), &DashboardConfig::default());
    Hub {
        ingestor: SignalIngestor::new(store, errors.clone()),
        dashboard: CachedDashboard::new(
            aggregator,
            Arc::new(MemoryCache::new()),
            errors,
            &CacheConfig::default(),
        ),
        _dir: dir,
    }
}

#[tokio::test]
async fn test_same_day_signals_from_both_sources_sync() {
    let hub = hub();

    let a = hub
        .ingestor
        .ingest(&json!({"scrip": "tcs", "reason": "Bullish breakout"}))
        .await
        .unwrap();
    assert_eq!(a.symbol, "TCS");
    assert_eq!(a.source, SourceKind::Indicator1);

    let b = hub
        .ingestor
        .ingest(&json!({"ticker": "tcs", "reason": "Oversold bounce", "capital_deployed_cr": 12.5}))
        .await
        .unwrap();
    assert_eq!(b.source, SourceKind::Indicator2);

    let read = hub.dashboard.read().await.unwrap();
    assert_eq!(read.cache, CacheStatus::Miss);

    let view = read.view;
    assert_eq!(view.synced_list.len(), 1);
    let tcs = &view.synced_list[0];
    assert_eq!(tcs.symbol, "TCS");
    assert_eq!(tcs.indicator1_reasons, vec!["Bullish breakout"]);
    assert_eq!(tcs.indicator2_reasons, vec!["Oversold bounce"]);

    assert_eq!(view.live_feed.len(), 1);
    assert_eq!(view.live_feed[0].symbol, "TCS");
    assert_eq!(view.live_feed[0].status, SyncStatus::Synced);

    assert_eq!(view.logs.oversold.len(), 1);
    assert_eq!(view.logs.oversold[0].capital, Some(12.5));
    assert_eq!(view.kpis.synced_signals, 1);
}

#[tokio::test]
async fn test_one_sided_symbol_awaits() {
    let hub = hub();

    for _ in 0..3 {
        hub.ingestor
            .ingest(&json!({"scrip": "infy", "reason": "Volume"}))
            .await
            .unwrap();
    }
    hub.ingestor
        .ingest(&json!({"ticker": "nifty", "reason": "HVD"}))
        .await
        .unwrap();

    let view = hub.dashboard.read().await.unwrap().view;

    assert!(view.synced_list.is_empty());
    assert!(view.live_feed.iter().all(|e| e.status == SyncStatus::Awaiting));
    assert_eq!(view.kpis.total_signals, 3);
    assert_eq!(view.index_signals.len(), 1);
    assert_eq!(view.logs.hvd.len(), 1);
}

#[tokio::test]
async fn test_rejected_payloads_are_not_stored() {
    let hub = hub();

    let missing_symbol = hub.ingestor.ingest(&json!({"reason": "Bullish"})).await;
    assert!(matches!(
        missing_symbol,
        Err(IngestError::Validation(ValidationError::MissingSymbol))
    ));

    let missing_reason = hub.ingestor.ingest(&json!({"ticker": "tcs"})).await;
    assert!(matches!(
        missing_reason,
        Err(IngestError::Validation(ValidationError::MissingReason))
    ));

    let view = hub.dashboard.read().await.unwrap().view;
    assert_eq!(view.kpis.total_signals, 0);
    assert_eq!(view.kpis.indicator2_count, 0);
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let hub = hub();
    hub.ingestor
        .ingest(&json!({"scrip": "tcs", "reason": "Breakout"}))
        .await
        .unwrap();

    let first = hub.dashboard.read().await.unwrap();
    let second = hub.dashboard.read().await.unwrap();

    assert_eq!(first.cache, CacheStatus::Miss);
    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(first.view, second.view);
}
