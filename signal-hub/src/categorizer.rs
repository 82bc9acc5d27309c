//! Reason categorization for Indicator2 logs.
//!
//! Each reason is lower-cased and matched against [`KEYWORD_PRIORITY`] in
//! order. The first keyword found decides the bucket. Reasons matching no
//! keyword are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBucket {
    Hvd,
    Bullish,
    Bearish,
    Oversold,
    Overbought,
}

/// Keyword to bucket, highest priority first
pub const KEYWORD_PRIORITY: [(&str, LogBucket); 5] = [
    ("hvd", LogBucket::Hvd),
    ("bullish", LogBucket::Bullish),
    ("bearish", LogBucket::Bearish),
    ("oversold", LogBucket::Oversold),
    ("overbought", LogBucket::Overbought),
];

/// Bucket for a reason string, if any keyword matches
pub fn bucket_for(reason: &str) -> Option<LogBucket> {
    let reason = reason.to_lowercase();
    KEYWORD_PRIORITY
        .iter()
        .find(|(keyword, _)| reason.contains(keyword))
        .map(|&(_, bucket)| bucket)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub symbol: String,
    pub reason: String,
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub capital: Option<f64>,
}

impl From<&Signal> for LogEntry {
    fn from(signal: &Signal) -> Self {
        Self {
            id: signal.id,
            symbol: signal.symbol.clone(),
            reason: signal.reason.clone(),
            time: signal.time_formatted(),
            timestamp: signal.created_at,
            capital: signal.capital,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedLogs {
    pub hvd: Vec<LogEntry>,
    pub bullish: Vec<LogEntry>,
    pub bearish: Vec<LogEntry>,
    pub oversold: Vec<LogEntry>,
    pub overbought: Vec<LogEntry>,
}

impl CategorizedLogs {
    pub fn bucket(&self, bucket: LogBucket) -> &[LogEntry] {
        match bucket {
            LogBucket::Hvd => &self.hvd,
            LogBucket::Bullish => &self.bullish,
            LogBucket::Bearish => &self.bearish,
            LogBucket::Oversold => &self.oversold,
            LogBucket::Overbought => &self.overbought,
        }
    }

    fn bucket_mut(&mut self, bucket: LogBucket) -> &mut Vec<LogEntry> {
        match bucket {
            LogBucket::Hvd => &mut self.hvd,
            LogBucket::Bullish => &mut self.bullish,
            LogBucket::Bearish => &mut self.bearish,
            LogBucket::Oversold => &mut self.oversold,
            LogBucket::Overbought => &mut self.overbought,
        }
    }

    pub fn total(&self) -> usize {
        KEYWORD_PRIORITY.iter().map(|&(_, b)| self.bucket(b).len()).sum()
    }
}

/// Partition signals into buckets, keeping input order within each bucket
pub fn categorize(signals: &[Signal]) -> CategorizedLogs {
    let mut logs = CategorizedLogs::default();
    for signal in signals {
        if let Some(bucket) = bucket_for(&signal.reason) {
            logs.bucket_mut(bucket).push(LogEntry::from(signal));
        }
    }
    logs
}
