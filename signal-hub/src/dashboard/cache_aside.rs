//! Cache-aside front for the dashboard.
//!
//! A fresh cache entry is returned as-is (HIT). Otherwise the view is rebuilt
//! from the store, written back with the configured TTL and returned (MISS).
//! Writes never evict, so a dashboard can be at most one TTL stale. Concurrent
//! misses each rebuild and overwrite the entry; there is no single-flight.
//! A broken cache degrades to always rebuilding and never fails the read.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DashboardAggregator, DashboardView};
use crate::cache::CacheGateway;
use crate::config::CacheConfig;
use crate::error::{CacheError, StorageError};
use crate::error_log::ErrorLogger;

const LOG_CONTEXT: &str = "api-dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header
    pub fn as_header(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardRead {
    pub view: DashboardView,
    pub cache: CacheStatus,
}

pub struct CachedDashboard {
    aggregator: DashboardAggregator,
    cache: Arc<dyn CacheGateway>,
    errors: Arc<dyn ErrorLogger>,
    key: String,
    ttl: Duration,
}

impl CachedDashboard {
    pub fn new(
        aggregator: DashboardAggregator,
        cache: Arc<dyn CacheGateway>,
        errors: Arc<dyn ErrorLogger>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            aggregator,
            cache,
            errors,
            key: config.dashboard_key.clone(),
            ttl: config.ttl(),
        }
    }

    pub async fn read(&self) -> Result<DashboardRead, StorageError> {
        if let Some(view) = self.cached_view().await {
            debug!("Cache hit - returning cached dashboard");
            return Ok(DashboardRead {
                view,
                cache: CacheStatus::Hit,
            });
        }

        info!("Cache miss - querying store");
        let view = match self.aggregator.build().await {
            Ok(view) => view,
            Err(e) => {
                // Failures are never cached
                self.errors.record(LOG_CONTEXT, &e, "dashboard aggregation failed");
                return Err(e);
            }
        };

        if let Err(e) = self.populate(&view).await {
            warn!("⚠️  Dashboard not cached: {}", e);
            self.errors.record(LOG_CONTEXT, &e, "cache populate failed");
        }

        Ok(DashboardRead {
            view,
            cache: CacheStatus::Miss,
        })
    }

    async fn cached_view(&self) -> Option<DashboardView> {
        let bytes = match self.cache.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("⚠️  Cache read failed, rebuilding from store: {}", e);
                self.errors.record(LOG_CONTEXT, &e, "cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("⚠️  Cached dashboard undecodable, rebuilding: {}", e);
                None
            }
        }
    }

    async fn populate(&self, view: &DashboardView) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(view)?;
        self.cache.set_with_ttl(&self.key, bytes, self.ttl).await
    }
}
