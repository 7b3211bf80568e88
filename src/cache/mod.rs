//! Key/value cache with TTL, the durable home of every cached credential.
//!
//! The credential manager only needs read-your-writes consistency from its
//! own process. Several processes may share one backend (see the `redis`
//! feature); they can then each refresh a token once, which is accepted.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BytedanceError;

mod memory;
#[cfg(feature = "redis")]
mod redis_cache;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

/// Storage backend for credentials.
///
/// Implementations must be safe to call concurrently; single-key atomicity
/// is enough, no multi-key transactions are required.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the live value stored under `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, BytedanceError>;

    /// Stores `value` under `key`, replacing any previous value, for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), BytedanceError>;

    async fn exists(&self, key: &str) -> Result<bool, BytedanceError>;

    async fn delete(&self, key: &str) -> Result<(), BytedanceError>;
}
