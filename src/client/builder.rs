use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request, Response};
use tower::layer::util::Identity;
use tower::{Layer, Service};

use crate::api::ApiContext;
use crate::cache::{Cache, MemoryCache};
use crate::config::ConfigBuilder;
use crate::credential::{CredentialProvider, DefaultCredentialManager, JsTicketManager};
use crate::error::BytedanceError;
use crate::transport::{HttpTransport, Transport};
use crate::types::{ClientKey, ClientSecret};

use super::MicroApp;

/// Builder for [`MicroApp`]
///
/// Cache, transport and credential provider default to [`MemoryCache`],
/// [`HttpTransport`] and [`DefaultCredentialManager`].
#[must_use]
#[derive(Default)]
pub struct MicroAppBuilder<M = Identity> {
    config: ConfigBuilder,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    cache: Option<Arc<dyn Cache>>,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for MicroAppBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroAppBuilder")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .field("transport", &self.transport.as_ref().map(|_| ".."))
            .field("credentials", &self.credentials.as_ref().map(|_| ".."))
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<M> MicroAppBuilder<M> {
    pub fn client_key(mut self, client_key: ClientKey) -> Self {
        self.config = self.config.client_key(client_key);
        self
    }

    pub fn client_secret(mut self, client_secret: ClientSecret) -> Self {
        self.config = self.config.client_secret(client_secret);
        self
    }

    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.cache_key_prefix(prefix);
        self
    }

    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.redirect_url(url);
        self
    }

    pub fn scopes(mut self, scopes: impl Into<String>) -> Self {
        self.config = self.config.scopes(scopes);
        self
    }

    pub fn open_base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.open_base_url(url);
        self
    }

    pub fn developer_base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.developer_base_url(url);
        self
    }

    /// Ignored when a custom transport is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignored when a custom transport is set.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credential_provider(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Wraps the default HTTP transport in a tower layer.
    pub fn with_middleware<M2>(self, middleware: M2) -> MicroAppBuilder<M2>
    where
        M2: Layer<HttpTransport> + Clone + Send + Sync + 'static,
    {
        MicroAppBuilder {
            config: self.config,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            cache: self.cache,
            transport: self.transport,
            credentials: self.credentials,
            middleware: Some(middleware),
        }
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns [`BytedanceError::Config`] for missing or invalid configuration.
    pub fn build(self) -> Result<MicroApp, BytedanceError>
    where
        M: Layer<HttpTransport> + Clone + Send + Sync + 'static,
        M::Service: Service<Request, Response = Response, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<Request>>::Future: Send + 'static,
    {
        let config = Arc::new(self.config.build()?);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HttpTransport::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                let transport = match self.middleware {
                    Some(middleware) => builder.with_middleware(middleware).build_layered()?,
                    None => builder.build()?,
                };
                Arc::new(transport)
            }
        };

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn Cache>);

        let credentials = self.credentials.unwrap_or_else(|| {
            Arc::new(DefaultCredentialManager::new(
                Arc::clone(&config),
                Arc::clone(&cache),
                Arc::clone(&transport),
            )) as Arc<dyn CredentialProvider>
        });

        let js_ticket = Arc::new(JsTicketManager::new(
            Arc::clone(&config),
            cache,
            Arc::clone(&transport),
        ));
        let context = Arc::new(ApiContext::new(config, transport, credentials));

        Ok(MicroApp::from_parts(context, js_ticket))
    }
}
