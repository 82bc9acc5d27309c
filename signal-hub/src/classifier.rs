//! Signal classification.
//!
//! Turns a raw webhook body into a [`NewSignal`]. The source kind comes from
//! which symbol field is present (`scrip` = Indicator1, `ticker` = Indicator2),
//! and every timestamp comes from the server clock. Sender-supplied times are
//! ignored so daily grouping cannot be skewed by a remote clock.

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::{NewSignal, SourceKind};

pub const SCRIP_FIELD: &str = "scrip";
pub const TICKER_FIELD: &str = "ticker";
pub const REASON_FIELD: &str = "reason";
pub const CAPITAL_FIELD: &str = "capital_deployed_cr";

/// Classify a payload against the current server time
pub fn classify(payload: &Value) -> Result<NewSignal, ValidationError> {
    classify_at(payload, Utc::now())
}

/// Classify a payload as if it arrived at `now`. Pure.
pub fn classify_at(payload: &Value, now: DateTime<Utc>) -> Result<NewSignal, ValidationError> {
    let fields = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let (source, symbol) = if let Some(scrip) = symbol_field(fields, SCRIP_FIELD)? {
        (SourceKind::Indicator1, scrip)
    } else if let Some(ticker) = symbol_field(fields, TICKER_FIELD)? {
        (SourceKind::Indicator2, ticker)
    } else {
        return Err(ValidationError::MissingSymbol);
    };

    let reason = match fields.get(REASON_FIELD) {
        None | Some(Value::Null) => return Err(ValidationError::MissingReason),
        Some(Value::String(s)) if s.is_empty() => return Err(ValidationError::MissingReason),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::InvalidReason),
    };

    let capital = match source {
        SourceKind::Indicator2 => capital_field(fields)?,
        SourceKind::Indicator1 => None,
    };

    // Millisecond precision matches what the store keeps
    let created_at = now.trunc_subsecs(3);

    Ok(NewSignal {
        date: created_at.date_naive(),
        symbol: symbol.to_uppercase(),
        source,
        reason,
        time: created_at.time().trunc_subsecs(0),
        capital,
        created_at,
    })
}

/// Symbol text for `key`. Numeric exchange codes are accepted as text.
///
/// Only a missing, null or empty field counts as absent. A field that is
/// present but unusable is rejected rather than skipped, so a broken `scrip`
/// never gets reclassified through `ticker`.
fn symbol_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::MissingSymbol);
            }
            Ok(Some(trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ValidationError::MissingSymbol),
    }
}

/// Deployed capital in crores. Zero and null both mean "not reported".
fn capital_field(fields: &Map<String, Value>) -> Result<Option<f64>, ValidationError> {
    let value = match fields.get(CAPITAL_FIELD) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::InvalidCapital)?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidCapital)?,
        Some(_) => return Err(ValidationError::InvalidCapital),
    };

    if !value.is_finite() {
        return Err(ValidationError::InvalidCapital);
    }

    Ok((value != 0.0).then_some(value))
}
