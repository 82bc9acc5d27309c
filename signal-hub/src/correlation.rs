//! Cross-source correlation for one trading day.
//!
//! A symbol is synced when both providers flagged it at least once on the
//! same date. Output is ordered by the most recent Indicator2 confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::types::Signal;

/// One symbol seen from both sources on the same date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub symbol: String,
    pub last_indicator1_time: DateTime<Utc>,
    pub last_indicator2_time: DateTime<Utc>,
}

/// Result of correlating a day's signals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    records: Vec<CorrelationRecord>,
    synced: HashSet<String>,
}

impl Correlation {
    /// Synced symbols, most recently confirmed first
    pub fn records(&self) -> &[CorrelationRecord] {
        &self.records
    }

    pub fn is_synced(&self, symbol: &str) -> bool {
        self.synced.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Correlate the day's Indicator1 and Indicator2 signals.
///
/// Inputs may be in any order; the caller is expected to have scoped both to one date.
pub fn correlate(indicator1: &[Signal], indicator2: &[Signal]) -> Correlation {
    let latest_1 = latest_by_symbol(indicator1);
    let latest_2 = latest_by_symbol(indicator2);

    let mut records: Vec<CorrelationRecord> = latest_1
        .iter()
        .filter_map(|(symbol, &last_1)| {
            latest_2.get(symbol).map(|&last_2| CorrelationRecord {
                symbol: (*symbol).to_string(),
                last_indicator1_time: last_1,
                last_indicator2_time: last_2,
            })
        })
        .collect();

    // Newest confirmation first, symbol order breaks ties
    records.sort_by(|a, b| {
        b.last_indicator2_time
            .cmp(&a.last_indicator2_time)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let synced = records.iter().map(|r| r.symbol.clone()).collect();

    debug!(
        "Correlated {} Indicator1 / {} Indicator2 signals -> {} synced symbols",
        indicator1.len(),
        indicator2.len(),
        records.len()
    );

    Correlation { records, synced }
}

fn latest_by_symbol(signals: &[Signal]) -> BTreeMap<&str, DateTime<Utc>> {
    let mut latest: BTreeMap<&str, DateTime<Utc>> = BTreeMap::new();
    for signal in signals {
        latest
            .entry(signal.symbol.as_str())
            .and_modify(|t| {
                if signal.created_at > *t {
                    *t = signal.created_at;
                }
            })
            .or_insert(signal.created_at);
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;
    use chrono::TimeZone;

    fn signal(id: i64, symbol: &str, source: SourceKind, secs: i64) -> Signal {
        let created_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs);
        Signal {
            id,
            date: created_at.date_naive(),
            symbol: symbol.to_string(),
            source,
            reason: format!("reason {}", id),
            time: created_at.time(),
            capital: None,
            created_at,
        }
    }

    fn a(id: i64, symbol: &str, secs: i64) -> Signal {
        signal(id, symbol, SourceKind::Indicator1, secs)
    }

    fn b(id: i64, symbol: &str, secs: i64) -> Signal {
        signal(id, symbol, SourceKind::Indicator2, secs)
    }

    #[test]
    fn test_synced_iff_both_sources() {
        let ind1 = vec![a(1, "TCS", 10), a(2, "INFY", 20), a(3, "HDFC", 30)];
        let ind2 = vec![b(4, "TCS", 40), b(5, "WIPRO", 50), b(6, "HDFC", 60)];

        let correlation = correlate(&ind1, &ind2);

        assert!(correlation.is_synced("TCS"));
        assert!(correlation.is_synced("HDFC"));
        assert!(!correlation.is_synced("INFY"));
        assert!(!correlation.is_synced("WIPRO"));
        assert_eq!(correlation.len(), 2);
    }

    #[test]
    fn test_repeats_in_one_source_never_sync() {
        let ind1: Vec<Signal> = (0..25).map(|i| a(i, "TCS", i)).collect();
        let correlation = correlate(&ind1, &[b(100, "INFY", 5)]);

        assert!(correlation.is_empty());
        assert!(!correlation.is_synced("TCS"));
    }

    #[test]
    fn test_latest_times_per_source() {
        let ind1 = vec![a(1, "TCS", 10), a(2, "TCS", 90), a(3, "TCS", 30)];
        let ind2 = vec![b(4, "TCS", 70), b(5, "TCS", 20)];

        let correlation = correlate(&ind1, &ind2);
        let record = &correlation.records()[0];

        assert_eq!(record.last_indicator1_time, ind1[1].created_at);
        assert_eq!(record.last_indicator2_time, ind2[0].created_at);
    }

    #[test]
    fn test_ordered_by_latest_indicator2_then_symbol() {
        let ind1 = vec![a(1, "AAA", 1), a(2, "BBB", 2), a(3, "CCC", 3), a(4, "DDD", 4)];
        let ind2 = vec![b(5, "AAA", 100), b(6, "CCC", 300), b(7, "DDD", 100), b(8, "BBB", 200)];

        let correlation = correlate(&ind1, &ind2);
        let order: Vec<&str> = correlation.records().iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(order, vec!["CCC", "BBB", "AAA", "DDD"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(correlate(&[], &[]).is_empty());
        assert!(correlate(&[a(1, "TCS", 1)], &[]).is_empty());
        assert!(correlate(&[], &[b(1, "TCS", 1)]).is_empty());
    }
}
