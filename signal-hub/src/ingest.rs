//! Webhook ingestion: classify, then persist.
//!
//! Nothing is written when classification fails. Storage failures are sent
//! to the error logger along with the serialized payload so they can be
//! replayed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::classifier::classify_at;
use crate::error::IngestError;
use crate::error_log::ErrorLogger;
use crate::store::SignalStore;
use crate::types::SourceKind;

const LOG_CONTEXT: &str = "webhook-handler";

/// Acknowledgement returned to the sender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReceipt {
    pub id: i64,
    pub symbol: String,
    #[serde(rename = "indicatorType")]
    pub source: SourceKind,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

pub struct SignalIngestor {
    store: Arc<dyn SignalStore>,
    errors: Arc<dyn ErrorLogger>,
}

impl SignalIngestor {
    pub fn new(store: Arc<dyn SignalStore>, errors: Arc<dyn ErrorLogger>) -> Self {
        Self { store, errors }
    }

    pub async fn ingest(&self, payload: &Value) -> Result<IngestReceipt, IngestError> {
        self.ingest_at(payload, Utc::now()).await
    }

    pub async fn ingest_at(&self, payload: &Value, now: DateTime<Utc>) -> Result<IngestReceipt, IngestError> {
        let signal = classify_at(payload, now)?;
        info!("Processing {} signal: {} {}", signal.source, signal.symbol, signal.reason);

        let id = match self.store.insert_signal(&signal).await {
            Ok(id) => id,
            Err(e) => {
                error!("Error processing webhook: {}", e);
                self.errors.record(LOG_CONTEXT, &e, &payload.to_string());
                return Err(e.into());
            }
        };

        info!("✅ Signal saved: id {}", id);
        Ok(IngestReceipt {
            id,
            symbol: signal.symbol,
            source: signal.source,
            reason: signal.reason,
            timestamp: signal.created_at,
        })
    }
}
