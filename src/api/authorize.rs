//! Douyin OAuth and mini app login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::r#trait::{ApiContext, BytedanceApi};
use crate::credential::{ResponseSchema, UserToken};
use crate::error::BytedanceError;
use crate::utils::with_query;

const CONNECT_PATH: &str = "/platform/oauth/connect";
const SILENT_AUTHORIZE_PATH: &str = "/platform/oauth/authorize/v2";
const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";
const JSCODE2SESSION_PATH: &str = "/api/apps/v2/jscode2session";

/// OAuth scope names.
pub mod scope {
    pub const USER_INFO: &str = "user_info";
    pub const FANS_LIST: &str = "fans.list";
    pub const FOLLOWING_LIST: &str = "following.list";
    pub const FANS_DATA: &str = "fans.data";

    pub const VIDEO_CREATE: &str = "video.create";
    pub const VIDEO_LIST: &str = "video.list";
    pub const VIDEO_DATA: &str = "video.data";
    pub const AWEME_SHARE: &str = "aweme.share";
    pub const VIDEO_DELETE: &str = "video.delete";
    pub const HOT_SEARCH: &str = "hotsearch";

    pub const VIDEO_COMMENT: &str = "video.comment";
    pub const IM: &str = "im";

    /// Scope requested by silent authorization.
    pub const LOGIN_ID: &str = "login_id";

    pub fn user_scope() -> String {
        [USER_INFO, FANS_LIST, FOLLOWING_LIST, FANS_DATA].join(",")
    }

    pub fn video_scope() -> String {
        [
            VIDEO_CREATE,
            VIDEO_LIST,
            VIDEO_DATA,
            AWEME_SHARE,
            VIDEO_DELETE,
            HOT_SEARCH,
        ]
        .join(",")
    }

    pub fn interact_scope() -> String {
        [VIDEO_COMMENT, IM].join(",")
    }

    pub fn all_scope() -> String {
        [interact_scope(), video_scope(), user_scope()].join(",")
    }
}

#[derive(Debug, Clone, Serialize)]
struct CodeToSessionRequest<'a> {
    appid: &'a str,
    secret: &'a str,
    anonymous_code: &'a str,
    code: &'a str,
}

/// Mini app login session.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CodeToSession {
    #[serde(default)]
    pub session_key: String,
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub anonymous_openid: String,
    #[serde(default)]
    pub unionid: String,
}

/// Douyin OAuth authorization and mini app login API
pub struct AuthorizeApi {
    context: Arc<ApiContext>,
}

impl AuthorizeApi {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self { context }
    }

    fn redirect_url(&self) -> Result<&str, BytedanceError> {
        self.context
            .config
            .redirect_url()
            .ok_or_else(|| BytedanceError::Config("redirect_url is not configured".to_string()))
    }

    /// URL that sends the user to the Douyin consent page.
    ///
    /// Requires `redirect_url` and `scopes` in the configuration.
    pub fn authorize_url(&self, state: &str) -> Result<String, BytedanceError> {
        let config = &self.context.config;
        let scopes = config
            .scopes()
            .ok_or_else(|| BytedanceError::Config("scopes are not configured".to_string()))?;

        Ok(with_query(
            &config.open_url(CONNECT_PATH),
            &[
                ("client_key", config.client_key()),
                ("response_type", "code"),
                ("scope", scopes),
                ("redirect_uri", self.redirect_url()?),
                ("state", state),
            ],
        ))
    }

    /// URL for silent authorization, which only obtains the user's open_id.
    pub fn silent_authorize_url(&self, state: &str) -> Result<String, BytedanceError> {
        let config = &self.context.config;
        Ok(with_query(
            &config.open_url(SILENT_AUTHORIZE_PATH),
            &[
                ("client_key", config.client_key()),
                ("response_type", "code"),
                ("scope", scope::LOGIN_ID),
                ("redirect_uri", self.redirect_url()?),
                ("state", state),
            ],
        ))
    }

    /// Exchanges an authorization code for the user's credentials and
    /// caches them, so later calls can use
    /// [`CredentialProvider::access_token`](crate::credential::CredentialProvider::access_token).
    ///
    /// GET /oauth/access_token
    pub async fn user_access_token(&self, code: &str) -> Result<UserToken, BytedanceError> {
        let config = &self.context.config;
        let url = with_query(
            &config.open_url(ACCESS_TOKEN_PATH),
            &[
                ("client_key", config.client_key()),
                ("client_secret", config.client_secret()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ],
        );

        let body = self.context.transport.get(&url).await?;
        let token: UserToken = ResponseSchema::OpenPlatform.decode(&body)?;
        self.context.credentials.set_access_token(&token).await?;
        Ok(token)
    }

    /// Exchanges a mini app login code (and/or anonymous code) for a session.
    ///
    /// POST /api/apps/v2/jscode2session
    pub async fn code_to_session(
        &self,
        code: &str,
        anonymous_code: &str,
    ) -> Result<CodeToSession, BytedanceError> {
        let config = &self.context.config;
        let request = CodeToSessionRequest {
            appid: config.client_key(),
            secret: config.client_secret(),
            anonymous_code,
            code,
        };
        let payload = serde_json::to_value(&request)?;

        let body = self
            .context
            .transport
            .post_json(&config.developer_url(JSCODE2SESSION_PATH), &payload)
            .await?;
        ResponseSchema::MiniApp.decode(&body)
    }
}

impl BytedanceApi for AuthorizeApi {
    fn context(&self) -> &ApiContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "authorize"
    }
}
