//! Shared context for the API façades.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::credential::CredentialProvider;
use crate::error::BytedanceError;
use crate::transport::Transport;
use crate::types::CommonResponse;

/// Resources every API façade needs: configuration, the transport and a
/// source of access tokens.
#[derive(Clone)]
pub struct ApiContext {
    pub(crate) config: Arc<Config>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("config", &self.config)
            .field("transport", &"Transport { .. }")
            .field("credentials", &"CredentialProvider { .. }")
            .finish()
    }
}

impl ApiContext {
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }

    /// Same context with a different credential provider.
    pub fn with_credentials(&self, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }

    /// POSTs `body` to an `open.douyin.com/api/apps/v1` endpoint with the
    /// client token in the `access-token` header and unwraps the envelope.
    pub(crate) async fn post_with_client_token<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BytedanceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let access_token = self.credentials.client_token().await?;
        let payload = serde_json::to_value(body)?;
        let response = self
            .transport
            .post_json_with_token(&self.config.open_url(path), &access_token, &payload)
            .await?;
        let envelope: CommonResponse<T> = serde_json::from_slice(&response)?;
        envelope.into_data()
    }
}

/// Implemented by every API façade.
pub trait BytedanceApi: Send + Sync {
    fn context(&self) -> &ApiContext;

    /// Short identifier of the API family, such as `"link"`.
    fn api_name(&self) -> &'static str {
        "unknown"
    }
}
