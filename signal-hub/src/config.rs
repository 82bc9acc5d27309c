use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};
use tracing::warn;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SIGNAL_HUB_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub dashboard: DashboardConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub wal_mode: bool,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/signals.db".to_string(),
            wal_mode: true,
            pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Worst-case dashboard staleness
    pub ttl_secs: u64,
    pub dashboard_key: String,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            dashboard_key: "dashboardData".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Benchmark tickers that get their own panel
    pub index_symbols: Vec<String>,
    pub index_panel_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            index_symbols: vec!["NIFTY".to_string(), "NIFTY1!".to_string()],
            index_panel_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    pub fn load_or_default() -> Result<Self> {
        // Explicit path wins, then config.toml, then config.example.toml
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(&path);
        }

        Self::load_with_fallback("config.toml", "config.example.toml")
    }

    /// Load `primary`, or `fallback` when `primary` is absent or unusable.
    /// A present-but-broken `primary` is reported, never skipped silently.
    pub fn load_with_fallback(primary: &str, fallback: &str) -> Result<Self> {
        if Path::new(primary).exists() {
            match Self::load(primary) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("⚠️  Ignoring {} ({:#}), falling back to {}", primary, e, fallback),
            }
        }

        Self::load(fallback).context("Failed to load configuration")
    }
}
