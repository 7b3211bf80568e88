//! Mini app URL links.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::r#trait::{ApiContext, BytedanceApi};
use crate::error::BytedanceError;

const GENERATE_PATH: &str = "/api/apps/v1/url_link/generate";
const QUERY_INFO_PATH: &str = "/api/apps/v1/url_link/query_info";
const QUERY_QUOTA_PATH: &str = "/api/apps/v1/url_link/query_quota";

#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct GenerateLinkRequest {
    pub app_id: String,
    /// Host app the link opens in, e.g. `douyin`.
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Unix timestamp after which the link stops working.
    pub expire_time: i64,
}

impl GenerateLinkRequest {
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>, expire_time: i64) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
            path: None,
            query: None,
            expire_time,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateLinkData {
    url_link: String,
}

#[derive(Debug, Clone, Serialize)]
struct QueryLinkRequest<'a> {
    app_id: &'a str,
    url_link: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct QuotaRequest<'a> {
    app_id: &'a str,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkInfo {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub expire_time: i64,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlLinkQuota {
    #[serde(default)]
    pub url_link_used: i64,
    #[serde(default)]
    pub url_link_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct QuotaData {
    #[serde(default)]
    url_link_quota: UrlLinkQuota,
}

/// Mini app URL link API
pub struct LinkApi {
    context: Arc<ApiContext>,
}

impl LinkApi {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self { context }
    }

    /// Generates a URL link that opens the mini app.
    ///
    /// POST /api/apps/v1/url_link/generate
    pub async fn generate(&self, request: &GenerateLinkRequest) -> Result<String, BytedanceError> {
        let data: GenerateLinkData = self
            .context
            .post_with_client_token(GENERATE_PATH, request)
            .await?;
        Ok(data.url_link)
    }

    /// POST /api/apps/v1/url_link/query_info
    pub async fn query(&self, app_id: &str, url_link: &str) -> Result<LinkInfo, BytedanceError> {
        self.context
            .post_with_client_token(QUERY_INFO_PATH, &QueryLinkRequest { app_id, url_link })
            .await
    }

    /// POST /api/apps/v1/url_link/query_quota
    pub async fn query_quota(&self, app_id: &str) -> Result<UrlLinkQuota, BytedanceError> {
        let data: QuotaData = self
            .context
            .post_with_client_token(QUERY_QUOTA_PATH, &QuotaRequest { app_id })
            .await?;
        Ok(data.url_link_quota)
    }
}

impl BytedanceApi for LinkApi {
    fn context(&self) -> &ApiContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "link"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::credential::DefaultCredentialManager;
    use crate::test_support::{test_config, StubTransport};

    const CLIENT_TOKEN_PATH: &str = "/oauth/oauth/client_token";

    fn api(transport: Arc<StubTransport>) -> LinkApi {
        let config = test_config();
        let manager = Arc::new(DefaultCredentialManager::new(
            Arc::clone(&config),
            Arc::new(MemoryCache::new()),
            transport.clone(),
        ));
        LinkApi::new(Arc::new(ApiContext::new(config, transport, manager)))
    }

    fn with_client_token(transport: StubTransport) -> StubTransport {
        transport.json(
            CLIENT_TOKEN_PATH,
            json!({"data": {"access_token": "clt-1", "expires_in": 7200, "error_code": 0}}),
        )
    }

    #[tokio::test]
    async fn test_generate_sends_client_token_header() {
        let transport = Arc::new(with_client_token(StubTransport::new()).json(
            GENERATE_PATH,
            json!({"err_no": 0, "err_msg": "", "log_id": "1", "data": {"url_link": "https://z.douyin.com/abc"}}),
        ));
        let api = api(Arc::clone(&transport));

        let request = GenerateLinkRequest::new("tt01", "douyin", 1700000000).path("pages/index");
        assert_eq!(api.generate(&request).await.unwrap(), "https://z.douyin.com/abc");

        let call = &transport.seen()[1];
        assert_eq!(call.access_token.as_deref(), Some("clt-1"));
        assert_eq!(
            call.body,
            Some(json!({"app_id": "tt01", "app_name": "douyin", "path": "pages/index", "expire_time": 1700000000}))
        );
    }

    #[tokio::test]
    async fn test_query_quota() {
        let transport = Arc::new(with_client_token(StubTransport::new()).json(
            QUERY_QUOTA_PATH,
            json!({"err_no": 0, "err_msg": "", "data": {"url_link_quota": {"url_link_used": 3, "url_link_limit": 100}}}),
        ));

        let quota = api(transport).query_quota("tt01").await.unwrap();
        assert_eq!(quota.url_link_used, 3);
        assert_eq!(quota.url_link_limit, 100);
    }

    #[tokio::test]
    async fn test_query_error() {
        let transport = Arc::new(with_client_token(StubTransport::new()).json(
            QUERY_INFO_PATH,
            json!({"err_no": 28001003, "err_msg": "url_link not found"}),
        ));

        let err = api(transport).query("tt01", "https://z.douyin.com/x").await.unwrap_err();
        assert_eq!(err.api_code(), Some(28001003));
    }
}
