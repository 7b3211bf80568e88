use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::keys::CredentialKind;
use super::token::{cache_ttl, AppToken, RefreshToken, ResponseSchema, UserToken};
use super::CredentialProvider;
use crate::cache::Cache;
use crate::config::Config;
use crate::error::BytedanceError;
use crate::transport::Transport;
use crate::utils::with_query;

const REFRESH_TOKEN_PATH: &str = "/oauth/oauth/refresh_token";
const RENEW_REFRESH_TOKEN_PATH: &str = "/oauth/oauth/renew_refresh_token";
const CLIENT_TOKEN_PATH: &str = "/oauth/oauth/client_token";
const SERVER_TOKEN_PATH: &str = "/api/apps/v2/token";

/// Application token flavours. They share one caching algorithm and differ
/// in endpoint, request shape and response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTokenKind {
    /// `GET open.douyin.com/oauth/oauth/client_token`
    Client,
    /// `POST developer.toutiao.com/api/apps/v2/token`
    Server,
}

impl AppTokenKind {
    pub fn credential_kind(self) -> CredentialKind<'static> {
        match self {
            AppTokenKind::Client => CredentialKind::ClientToken,
            AppTokenKind::Server => CredentialKind::ServerToken,
        }
    }

    pub fn schema(self) -> ResponseSchema {
        match self {
            AppTokenKind::Client => ResponseSchema::OpenPlatform,
            AppTokenKind::Server => ResponseSchema::MiniApp,
        }
    }
}

/// Cache-backed [`CredentialProvider`].
///
/// Reads go to the cache without locking. A miss takes the manager-wide
/// refresh lock, re-checks the cache, and only then calls upstream; the lock
/// is held until the new credential is cached. One lock covers every
/// credential kind and identity, so refreshes are serialized per manager.
pub struct DefaultCredentialManager {
    config: Arc<Config>,
    cache: Arc<dyn Cache>,
    transport: Arc<dyn Transport>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for DefaultCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCredentialManager")
            .field("client_key", &self.config.client_key())
            .field("cache_key_prefix", &self.config.cache_key_prefix())
            .finish_non_exhaustive()
    }
}

impl DefaultCredentialManager {
    pub fn new(config: Arc<Config>, cache: Arc<dyn Cache>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            cache,
            transport,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Cache key under which `kind` is stored.
    pub fn cache_key(&self, kind: CredentialKind<'_>) -> String {
        kind.cache_key(self.config.cache_key_prefix(), self.config.client_key())
    }

    async fn cached(&self, key: &str) -> Result<Option<String>, BytedanceError> {
        Ok(self.cache.get(key).await?.filter(|value| !value.is_empty()))
    }

    async fn store(
        &self,
        kind: CredentialKind<'_>,
        value: &str,
        expires_in: i64,
    ) -> Result<(), BytedanceError> {
        match cache_ttl(expires_in) {
            Some(ttl) => self.cache.set(&self.cache_key(kind), value, ttl).await,
            None => {
                warn!(
                    "[Bytedance] {} expires in {}s, too short to cache",
                    kind.name(),
                    expires_in
                );
                Ok(())
            }
        }
    }

    async fn store_user_token(&self, open_id: &str, token: &UserToken) -> Result<(), BytedanceError> {
        self.store(
            CredentialKind::AccessToken(open_id),
            &token.access_token,
            token.expires_in,
        )
        .await?;
        // Keep the previous refresh token when upstream did not rotate it.
        if token.refresh_token.is_empty() {
            return Ok(());
        }
        let key = self.cache_key(CredentialKind::RefreshToken(open_id));
        match cache_ttl(token.refresh_expires_in) {
            Some(ttl) => self.cache.set(&key, &token.refresh_token, ttl).await,
            None => {
                // A rotated refresh token revokes the old one upstream.
                if self.cached(&key).await?.as_deref() != Some(token.refresh_token.as_str()) {
                    warn!(
                        "[Bytedance] rotated refresh_token for {} expires in {}s, dropping the cached one",
                        open_id, token.refresh_expires_in
                    );
                    self.cache.delete(&key).await?;
                }
                Ok(())
            }
        }
    }

    /// Exchanges a refresh token for a new user credential pair.
    ///
    /// Nothing is cached; [`CredentialProvider::access_token`] does that.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<UserToken, BytedanceError> {
        let url = with_query(
            &self.config.open_url(REFRESH_TOKEN_PATH),
            &[
                ("client_key", self.config.client_key()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        );

        let body = self.transport.get(&url).await?;
        let token: UserToken = ResponseSchema::OpenPlatform.decode(&body)?;
        if token.access_token.is_empty() {
            return Err(BytedanceError::Token(
                "refresh response carried no access_token".to_string(),
            ));
        }
        Ok(token)
    }

    /// Fetches an application token from upstream, bypassing the cache.
    pub async fn fetch_app_token(&self, kind: AppTokenKind) -> Result<AppToken, BytedanceError> {
        let body = match kind {
            AppTokenKind::Client => {
                let url = with_query(
                    &self.config.open_url(CLIENT_TOKEN_PATH),
                    &[
                        ("client_key", self.config.client_key()),
                        ("client_secret", self.config.client_secret()),
                        ("grant_type", "client_credential"),
                    ],
                );
                self.transport.get(&url).await?
            }
            AppTokenKind::Server => {
                let payload = serde_json::json!({
                    "appid": self.config.client_key(),
                    "secret": self.config.client_secret(),
                    "grant_type": "client_credential",
                });
                self.transport
                    .post_json(&self.config.developer_url(SERVER_TOKEN_PATH), &payload)
                    .await?
            }
        };

        let token: AppToken = kind.schema().decode(&body)?;
        if token.access_token.is_empty() {
            return Err(BytedanceError::Token(format!(
                "{} response carried no access_token",
                kind.credential_kind().name()
            )));
        }
        Ok(token)
    }

    async fn app_token(&self, kind: AppTokenKind) -> Result<String, BytedanceError> {
        let credential = kind.credential_kind();
        let key = self.cache_key(credential);
        if let Some(token) = self.cached(&key).await? {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached(&key).await? {
            debug!("[Bytedance] {} refreshed by a concurrent caller", credential.name());
            return Ok(token);
        }

        debug!("[Bytedance] {} cache miss, fetching", credential.name());
        let token = self.fetch_app_token(kind).await.map_err(|e| {
            warn!("[Bytedance] {} fetch failed: {}", credential.name(), e);
            e
        })?;
        info!(
            "[Bytedance] {} refreshed, expires in {}s",
            credential.name(),
            token.expires_in
        );
        self.store(credential, &token.access_token, token.expires_in)
            .await?;
        Ok(token.access_token)
    }

    /// Removes both cached user credentials of `open_id`.
    ///
    /// The next [`CredentialProvider::access_token`] call for this user fails
    /// with [`BytedanceError::NeedsReauthorization`].
    pub async fn revoke_user(&self, open_id: &str) -> Result<(), BytedanceError> {
        self.invalidate(CredentialKind::AccessToken(open_id)).await?;
        self.invalidate(CredentialKind::RefreshToken(open_id)).await
    }
}

fn require_open_id(open_id: &str) -> Result<(), BytedanceError> {
    if open_id.is_empty() {
        return Err(BytedanceError::Token("open_id must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl CredentialProvider for DefaultCredentialManager {
    async fn access_token(&self, open_id: &str) -> Result<String, BytedanceError> {
        require_open_id(open_id)?;

        let access_key = self.cache_key(CredentialKind::AccessToken(open_id));
        if let Some(token) = self.cached(&access_key).await? {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached(&access_key).await? {
            debug!("[Bytedance] access_token for {} refreshed by a concurrent caller", open_id);
            return Ok(token);
        }

        let refresh_key = self.cache_key(CredentialKind::RefreshToken(open_id));
        let Some(refresh_token) = self.cached(&refresh_key).await? else {
            warn!("[Bytedance] no refresh_token on record for {}", open_id);
            return Err(BytedanceError::NeedsReauthorization {
                open_id: open_id.to_string(),
            });
        };

        debug!("[Bytedance] access_token for {} missing, refreshing", open_id);
        let mut token = self
            .refresh_access_token(&refresh_token)
            .await
            .map_err(|e| {
                warn!("[Bytedance] access_token refresh for {} failed: {}", open_id, e);
                e
            })?;
        info!(
            "[Bytedance] access_token for {} refreshed, expires in {}s",
            open_id, token.expires_in
        );

        // Refresh responses do not always echo the open_id.
        token.open_id = open_id.to_string();
        self.store_user_token(open_id, &token).await?;
        Ok(token.access_token)
    }

    async fn set_access_token(&self, token: &UserToken) -> Result<(), BytedanceError> {
        require_open_id(&token.open_id)?;
        if token.access_token.is_empty() {
            return Err(BytedanceError::Token("access_token must not be empty".to_string()));
        }
        self.store_user_token(&token.open_id, token).await
    }

    async fn client_token(&self) -> Result<String, BytedanceError> {
        self.app_token(AppTokenKind::Client).await
    }

    async fn server_token(&self) -> Result<String, BytedanceError> {
        self.app_token(AppTokenKind::Server).await
    }

    async fn renew_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshToken, BytedanceError> {
        let url = with_query(
            &self.config.open_url(RENEW_REFRESH_TOKEN_PATH),
            &[
                ("client_key", self.config.client_key()),
                ("refresh_token", refresh_token),
            ],
        );

        let body = self.transport.get(&url).await?;
        let renewed: RefreshToken = ResponseSchema::OpenPlatform.decode(&body)?;
        if renewed.refresh_token.is_empty() {
            return Err(BytedanceError::Token(
                "renew response carried no refresh_token".to_string(),
            ));
        }
        Ok(renewed)
    }

    async fn invalidate(&self, kind: CredentialKind<'_>) -> Result<(), BytedanceError> {
        debug!("[Bytedance] invalidating {}", kind.name());
        self.cache.delete(&self.cache_key(kind)).await
    }
}
