//! SDK configuration.

use crate::error::BytedanceError;
use crate::types::{ClientKey, ClientSecret};

pub const DEFAULT_OPEN_BASE_URL: &str = "https://open.douyin.com";
pub const DEFAULT_DEVELOPER_BASE_URL: &str = "https://developer.toutiao.com";
/// Prefix used for cache keys when none is configured.
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "bytedance_douyin_lite";

/// Open platform configuration shared by the credential manager and the
/// API façades.
#[derive(Debug, Clone)]
pub struct Config {
    client_key: ClientKey,
    client_secret: ClientSecret,
    cache_key_prefix: String,
    redirect_url: Option<String>,
    scopes: Option<String>,
    open_base_url: String,
    developer_base_url: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn client_key(&self) -> &str {
        self.client_key.as_str()
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.as_str()
    }

    pub fn cache_key_prefix(&self) -> &str {
        &self.cache_key_prefix
    }

    /// OAuth callback registered for the web authorization flow.
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Comma-separated OAuth scopes requested from the user.
    pub fn scopes(&self) -> Option<&str> {
        self.scopes.as_deref()
    }

    pub fn open_base_url(&self) -> &str {
        &self.open_base_url
    }

    pub fn developer_base_url(&self) -> &str {
        &self.developer_base_url
    }

    /// Absolute URL on the open platform host.
    pub(crate) fn open_url(&self, path: &str) -> String {
        format!("{}{}", self.open_base_url, path)
    }

    /// Absolute URL on the mini app developer host.
    pub(crate) fn developer_url(&self, path: &str) -> String {
        format!("{}{}", self.developer_base_url, path)
    }
}

/// Builder for [`Config`]
///
/// # Example
///
/// ```rust
/// use bytedance_sdk::config::Config;
/// use bytedance_sdk::types::{ClientKey, ClientSecret};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::builder()
///     .client_key(ClientKey::new("tt1234567890abcdef")?)
///     .client_secret(ClientSecret::new("your_secret")?)
///     .build()?;
///
/// assert_eq!(config.cache_key_prefix(), "bytedance_douyin_lite");
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    client_key: Option<ClientKey>,
    client_secret: Option<ClientSecret>,
    cache_key_prefix: Option<String>,
    redirect_url: Option<String>,
    scopes: Option<String>,
    open_base_url: Option<String>,
    developer_base_url: Option<String>,
}

impl ConfigBuilder {
    pub fn client_key(mut self, client_key: ClientKey) -> Self {
        self.client_key = Some(client_key);
        self
    }

    pub fn client_secret(mut self, client_secret: ClientSecret) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    /// Prefix of every cache key. Deployments sharing one cache must agree on it.
    ///
    /// Default: `bytedance_douyin_lite`
    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = Some(prefix.into());
        self
    }

    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    /// Default: `<https://open.douyin.com>`
    pub fn open_base_url(mut self, url: impl Into<String>) -> Self {
        self.open_base_url = Some(url.into());
        self
    }

    /// Default: `<https://developer.toutiao.com>`
    pub fn developer_base_url(mut self, url: impl Into<String>) -> Self {
        self.developer_base_url = Some(url.into());
        self
    }

    /// Build the Config
    ///
    /// # Errors
    /// Returns [`BytedanceError::Config`] if client_key or client_secret is not
    /// set, or a base URL is not an http(s) URL.
    pub fn build(self) -> Result<Config, BytedanceError> {
        let client_key = self
            .client_key
            .ok_or_else(|| BytedanceError::Config("client_key is required".to_string()))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| BytedanceError::Config("client_secret is required".to_string()))?;

        let cache_key_prefix = self
            .cache_key_prefix
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_KEY_PREFIX.to_string());

        let open_base_url = base_url(self.open_base_url, DEFAULT_OPEN_BASE_URL)?;
        let developer_base_url = base_url(self.developer_base_url, DEFAULT_DEVELOPER_BASE_URL)?;

        Ok(Config {
            client_key,
            client_secret,
            cache_key_prefix,
            redirect_url: self.redirect_url.filter(|url| !url.is_empty()),
            scopes: self.scopes.filter(|scopes| !scopes.is_empty()),
            open_base_url,
            developer_base_url,
        })
    }
}

fn base_url(url: Option<String>, default: &str) -> Result<String, BytedanceError> {
    let url = url.unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(BytedanceError::Config(format!(
            "base url must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
