pub mod memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheError;

pub use memory::MemoryCache;

/// Key-value cache with per-entry expiry (Redis `GET` / `SETEX` semantics)
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Live value for `key`; expired entries read as `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}
