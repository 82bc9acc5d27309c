use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Which upstream provider raised the alert.
///
/// Decided only by the payload field present at ingestion, never declared by the sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// Source A, sends `scrip`
    Indicator1,
    /// Source B, sends `ticker` and optionally deployed capital
    Indicator2,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Indicator1 => "Indicator1",
            SourceKind::Indicator2 => "Indicator2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Indicator1" => Some(SourceKind::Indicator1),
            "Indicator2" => Some(SourceKind::Indicator2),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified signal that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSignal {
    pub date: NaiveDate,
    pub symbol: String,
    pub source: SourceKind,
    pub reason: String,
    pub time: NaiveTime,
    pub capital: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl NewSignal {
    pub fn with_id(self, id: i64) -> Signal {
        Signal {
            id,
            date: self.date,
            symbol: self.symbol,
            source: self.source,
            reason: self.reason,
            time: self.time,
            capital: self.capital,
            created_at: self.created_at,
        }
    }
}

/// A persisted signal. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub date: NaiveDate,
    pub symbol: String,
    pub source: SourceKind,
    pub reason: String,
    pub time: NaiveTime,
    pub capital: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Wall-clock time as shown on the dashboard (HH:MM:SS)
    pub fn time_formatted(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Awaiting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_round_trips_through_str() {
        for kind in [SourceKind::Indicator1, SourceKind::Indicator2] {
            assert_eq!(SourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SourceKind::parse("Indicator3"), None);
    }
}
