use std::sync::Arc;

use crate::api::authorize::{AuthorizeApi, CodeToSession};
use crate::api::link::LinkApi;
use crate::api::qrcode::{QrcodeApi, QrcodeOptions};
use crate::api::schema::SchemaApi;
use crate::api::ApiContext;
use crate::config::Config;
use crate::credential::{CredentialKind, CredentialProvider, JsTicketManager, UserToken};
use crate::error::BytedanceError;

use super::builder::MicroAppBuilder;

/// Unified Douyin mini app client
///
/// Entry point of the SDK. Credentials are cached and refreshed behind the
/// scenes; the API façades share one [`ApiContext`].
///
/// # Example
///
/// ```rust,no_run
/// use bytedance_sdk::MicroApp;
/// use bytedance_sdk::types::{ClientKey, ClientSecret};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let app = MicroApp::builder()
///         .client_key(ClientKey::new("tt1234567890abcdef")?)
///         .client_secret(ClientSecret::new("your_secret")?)
///         .build()?;
///
///     let token = app.client_token().await?;
///     println!("client token: {}", token);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MicroApp {
    context: Arc<ApiContext>,
    js_ticket: Arc<JsTicketManager>,
}

impl std::fmt::Debug for MicroApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroApp")
            .field("client_key", &self.client_key())
            .finish_non_exhaustive()
    }
}

impl MicroApp {
    pub fn builder() -> MicroAppBuilder {
        MicroAppBuilder::default()
    }

    pub(crate) fn from_parts(context: Arc<ApiContext>, js_ticket: Arc<JsTicketManager>) -> Self {
        Self { context, js_ticket }
    }

    pub fn client_key(&self) -> &str {
        self.context.config.client_key()
    }

    pub fn config(&self) -> &Config {
        &self.context.config
    }

    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Swaps the credential provider, keeping configuration and transport.
    pub fn with_credential_provider(self, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            context: Arc::new(self.context.with_credentials(credentials)),
            js_ticket: self.js_ticket,
        }
    }

    // Credentials

    pub async fn access_token(&self, open_id: &str) -> Result<String, BytedanceError> {
        self.context.credentials.access_token(open_id).await
    }

    pub async fn set_access_token(&self, token: &UserToken) -> Result<(), BytedanceError> {
        self.context.credentials.set_access_token(token).await
    }

    pub async fn client_token(&self) -> Result<String, BytedanceError> {
        self.context.credentials.client_token().await
    }

    pub async fn server_token(&self) -> Result<String, BytedanceError> {
        self.context.credentials.server_token().await
    }

    pub async fn invalidate(&self, kind: CredentialKind<'_>) -> Result<(), BytedanceError> {
        if kind == CredentialKind::JsTicket {
            return self.js_ticket.invalidate().await;
        }
        self.context.credentials.invalidate(kind).await
    }

    /// JS-API ticket, fetched with the client token on a cache miss.
    pub async fn js_ticket(&self) -> Result<String, BytedanceError> {
        let client_token = self.client_token().await?;
        self.js_ticket.ticket(&client_token).await
    }

    // APIs

    pub fn authorize(&self) -> AuthorizeApi {
        AuthorizeApi::new(self.context.clone())
    }

    pub fn link(&self) -> LinkApi {
        LinkApi::new(self.context.clone())
    }

    pub fn schema(&self) -> SchemaApi {
        SchemaApi::new(self.context.clone())
    }

    pub fn qrcode(&self) -> QrcodeApi {
        QrcodeApi::new(self.context.clone())
    }

    // Shortcuts

    pub fn authorize_url(&self, state: &str) -> Result<String, BytedanceError> {
        self.authorize().authorize_url(state)
    }

    pub async fn user_access_token(&self, code: &str) -> Result<UserToken, BytedanceError> {
        self.authorize().user_access_token(code).await
    }

    pub async fn code_to_session(
        &self,
        code: &str,
        anonymous_code: &str,
    ) -> Result<CodeToSession, BytedanceError> {
        self.authorize().code_to_session(code, anonymous_code).await
    }

    pub async fn fetch_qrcode(&self, options: &QrcodeOptions) -> Result<Vec<u8>, BytedanceError> {
        self.qrcode().fetch_code(options).await
    }
}
