// Signal Hub - HTTP service
// Owns the SQLite pool and dashboard cache for the life of the process

use anyhow::{Context, Result};
use signal_hub::cache::MemoryCache;
use signal_hub::config::{Config, CONFIG_PATH_ENV};
use signal_hub::dashboard::{CachedDashboard, DashboardAggregator};
use signal_hub::error_log::SqliteErrorLogger;
use signal_hub::ingest::SignalIngestor;
use signal_hub::logging::init_logging;
use signal_hub::server::{self, AppState};
use signal_hub::store::SqliteSignalStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load_or_default()?;
    init_logging(&config.monitoring);

    info!("🚀 Signal Hub Starting...");
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => info!("⚙️  Configuration loaded from {}", path),
        Err(_) => info!("⚙️  Configuration loaded"),
    }

    let store = SqliteSignalStore::from_config(&config.database)
        .context("Failed to open signal store")?;
    info!("✅ Database initialized: {}", config.database.path);

    let errors = Arc::new(SqliteErrorLogger::new(store.pool()));
    let store = Arc::new(store);

    let cache = MemoryCache::new();
    spawn_cache_janitor(cache.clone(), config.cache.ttl());
    info!("🗂️  Dashboard cache: key={} ttl={}s", config.cache.dashboard_key, config.cache.ttl_secs);

    let aggregator = DashboardAggregator::new(store.clone(), &config.dashboard);
    info!("📊 Index panel: {:?} (top {})", config.dashboard.index_symbols, config.dashboard.index_panel_limit);

    let state = AppState {
        ingestor: Arc::new(SignalIngestor::new(store.clone(), errors.clone())),
        dashboard: Arc::new(CachedDashboard::new(aggregator, Arc::new(cache), errors, &config.cache)),
    };

    server::serve(&config.server.bind_addr, state, shutdown_signal()).await?;

    // Last handles go here; the pool closes with them
    drop(store);
    info!("👋 Signal Hub stopped");
    Ok(())
}

/// Periodically drops expired cache entries so memory stays bounded
fn spawn_cache_janitor(cache: MemoryCache, ttl: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired cache entries", purged);
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
