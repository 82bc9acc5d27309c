//! Dashboard aggregation.
//!
//! Builds the composite view for one date from three store reads: all
//! Indicator1 signals, all Indicator2 signals, and Indicator2 signals for the
//! index allow-list. Apart from `timestamp`, the view is a pure function of
//! those reads, which is what makes it safe to cache.

pub mod cache_aside;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::categorizer::{categorize, CategorizedLogs};
use crate::config::DashboardConfig;
use crate::correlation::correlate;
use crate::error::StorageError;
use crate::store::SignalStore;
use crate::types::{Signal, SourceKind, SyncStatus};

pub use cache_aside::{CacheStatus, CachedDashboard, DashboardRead};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFeedEntry {
    pub id: i64,
    pub symbol: String,
    pub reason: String,
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub status: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedEntry {
    pub symbol: String,
    #[serde(rename = "ind1Reasons")]
    pub indicator1_reasons: Vec<String>,
    #[serde(rename = "ind2Reasons")]
    pub indicator2_reasons: Vec<String>,
    #[serde(rename = "lastInd1Time")]
    pub last_indicator1_time: DateTime<Utc>,
    #[serde(rename = "lastInd2Time")]
    pub last_indicator2_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSignal {
    pub symbol: String,
    pub reason: String,
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Indicator1 signals today
    pub total_signals: usize,
    /// Symbols confirmed by both sources today
    pub synced_signals: usize,
    pub latest_signal: Option<LiveFeedEntry>,
    pub indicator2_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub kpis: Kpis,
    #[serde(rename = "liveFeed")]
    pub live_feed: Vec<LiveFeedEntry>,
    pub logs: CategorizedLogs,
    #[serde(rename = "dashboardSyncedList")]
    pub synced_list: Vec<SyncedEntry>,
    #[serde(rename = "niftySignals")]
    pub index_signals: Vec<IndexSignal>,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    /// Equality ignoring the generation timestamp
    pub fn same_content(&self, other: &DashboardView) -> bool {
        self.kpis == other.kpis
            && self.live_feed == other.live_feed
            && self.logs == other.logs
            && self.synced_list == other.synced_list
            && self.index_signals == other.index_signals
    }
}

/// Assemble the view from already-fetched, newest-first signal lists
pub fn compose(
    indicator1: &[Signal],
    indicator2: &[Signal],
    index: &[Signal],
    index_panel_limit: usize,
    generated_at: DateTime<Utc>,
) -> DashboardView {
    let correlation = correlate(indicator1, indicator2);

    let live_feed: Vec<LiveFeedEntry> = indicator1
        .iter()
        .map(|signal| LiveFeedEntry {
            id: signal.id,
            symbol: signal.symbol.clone(),
            reason: signal.reason.clone(),
            time: signal.time_formatted(),
            timestamp: signal.created_at,
            status: if correlation.is_synced(&signal.symbol) {
                SyncStatus::Synced
            } else {
                SyncStatus::Awaiting
            },
        })
        .collect();

    let logs = categorize(indicator2);

    let reasons_1 = reasons_by_symbol(indicator1);
    let reasons_2 = reasons_by_symbol(indicator2);
    let synced_list = correlation
        .records()
        .iter()
        .map(|record| SyncedEntry {
            symbol: record.symbol.clone(),
            indicator1_reasons: reasons_1.get(record.symbol.as_str()).cloned().unwrap_or_default(),
            indicator2_reasons: reasons_2.get(record.symbol.as_str()).cloned().unwrap_or_default(),
            last_indicator1_time: record.last_indicator1_time,
            last_indicator2_time: record.last_indicator2_time,
        })
        .collect();

    let index_signals = index
        .iter()
        .take(index_panel_limit)
        .map(|signal| IndexSignal {
            symbol: signal.symbol.clone(),
            reason: signal.reason.clone(),
            time: signal.time_formatted(),
            timestamp: signal.created_at,
        })
        .collect();

    let kpis = Kpis {
        total_signals: indicator1.len(),
        synced_signals: correlation.len(),
        latest_signal: live_feed.first().cloned(),
        indicator2_count: indicator2.len(),
    };

    DashboardView {
        kpis,
        live_feed,
        logs,
        synced_list,
        index_signals,
        generated_at,
    }
}

/// Every reason per symbol, keeping fetch order
fn reasons_by_symbol(signals: &[Signal]) -> HashMap<&str, Vec<String>> {
    let mut reasons: HashMap<&str, Vec<String>> = HashMap::new();
    for signal in signals {
        reasons
            .entry(signal.symbol.as_str())
            .or_default()
            .push(signal.reason.clone());
    }
    reasons
}

/// Fetches a day's signals and composes the dashboard view
pub struct DashboardAggregator {
    store: Arc<dyn SignalStore>,
    index_symbols: Vec<String>,
    index_panel_limit: usize,
}

impl DashboardAggregator {
    pub fn new(store: Arc<dyn SignalStore>, config: &DashboardConfig) -> Self {
        Self {
            store,
            index_symbols: config.index_symbols.iter().map(|s| s.to_uppercase()).collect(),
            index_panel_limit: config.index_panel_limit,
        }
    }

    /// View for today (UTC) as of now
    pub async fn build(&self) -> Result<DashboardView, StorageError> {
        let now = Utc::now();
        self.build_for(now.date_naive(), now).await
    }

    /// Any failed read aborts the whole build; partial views are never returned.
    pub async fn build_for(
        &self,
        date: NaiveDate,
        generated_at: DateTime<Utc>,
    ) -> Result<DashboardView, StorageError> {
        let (indicator1, indicator2, index) = tokio::try_join!(
            self.store.query_signals(date, SourceKind::Indicator1, None),
            self.store.query_signals(date, SourceKind::Indicator2, None),
            self.store
                .query_signals(date, SourceKind::Indicator2, Some(self.index_symbols.as_slice())),
        )?;

        let view = compose(&indicator1, &indicator2, &index, self.index_panel_limit, generated_at);

        info!(
            "📊 Dashboard built for {}: {} Indicator1, {} Indicator2, {} synced",
            date, view.kpis.total_signals, view.kpis.indicator2_count, view.kpis.synced_signals
        );
        Ok(view)
    }
}
