//! Credential management: cached OAuth access tokens, application tokens and
//! JS-API tickets.
//!
//! Every credential lives in a [`Cache`](crate::cache::Cache) under a key
//! derived from [`CredentialKind`], with a lifetime shortened by
//! [`TTL_SAFETY_MARGIN_SECS`]. On a cache miss the
//! [`DefaultCredentialManager`] refreshes from upstream while holding a
//! manager-wide lock, so concurrent callers in one process trigger at most
//! one upstream call per miss.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bytedance_sdk::cache::MemoryCache;
//! use bytedance_sdk::config::Config;
//! use bytedance_sdk::credential::{CredentialProvider, DefaultCredentialManager};
//! use bytedance_sdk::transport::HttpTransport;
//! use bytedance_sdk::types::{ClientKey, ClientSecret};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder()
//!     .client_key(ClientKey::new("tt1234567890abcdef")?)
//!     .client_secret(ClientSecret::new("your_secret")?)
//!     .build()?;
//!
//! let manager = DefaultCredentialManager::new(
//!     Arc::new(config),
//!     Arc::new(MemoryCache::new()),
//!     Arc::new(HttpTransport::new()?),
//! );
//!
//! let client_token = manager.client_token().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::BytedanceError;

mod js_ticket;
mod keys;
mod manager;
mod token;

pub use js_ticket::JsTicketManager;
pub use keys::CredentialKind;
pub use manager::{AppTokenKind, DefaultCredentialManager};
pub use token::{
    cache_ttl, AppToken, JsTicket, RefreshToken, ResponseSchema, UserToken,
    TTL_SAFETY_MARGIN_SECS,
};

/// Source of access tokens for the API façades.
///
/// [`DefaultCredentialManager`] is the cache-backed implementation; supply
/// your own to obtain tokens from somewhere else (a central token service,
/// fixed tokens in tests).
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Access token of the user identified by `open_id`.
    ///
    /// # Errors
    /// [`BytedanceError::NeedsReauthorization`] when the user's credentials
    /// are gone and they must go through OAuth consent again.
    async fn access_token(&self, open_id: &str) -> Result<String, BytedanceError>;

    /// Seeds the user's access and refresh tokens, e.g. right after an
    /// authorization-code exchange.
    async fn set_access_token(&self, token: &UserToken) -> Result<(), BytedanceError>;

    /// Open platform application token.
    async fn client_token(&self) -> Result<String, BytedanceError>;

    /// Mini app server-side application token.
    async fn server_token(&self) -> Result<String, BytedanceError>;

    /// Exchanges `refresh_token` for a new refresh token. Nothing is cached.
    async fn renew_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshToken, BytedanceError> {
        let _ = refresh_token;
        Err(BytedanceError::Token(
            "refresh token renewal is not supported by this provider".to_string(),
        ))
    }

    /// Drops a cached credential so the next request fetches a new one.
    async fn invalidate(&self, kind: CredentialKind<'_>) -> Result<(), BytedanceError> {
        let _ = kind;
        Ok(())
    }
}
