//! Mini app schema links.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::r#trait::{ApiContext, BytedanceApi};
use crate::error::BytedanceError;

const GENERATE_PATH: &str = "/api/apps/v1/url/generate_schema";
const QUERY_PATH: &str = "/api/apps/v1/url/query_schema";
const QUERY_QUOTA_PATH: &str = "/api/apps/v1/url/query_schema_quota";

#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct GenerateSchemaRequest {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub no_expire: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
}

impl GenerateSchemaRequest {
    /// Long-term schema that never expires.
    pub fn permanent(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            query: None,
            path: None,
            no_expire: true,
            expire_time: None,
        }
    }

    /// Short-term schema valid until the given unix timestamp.
    pub fn expiring(app_id: impl Into<String>, expire_time: i64) -> Self {
        Self {
            no_expire: false,
            expire_time: Some(expire_time),
            ..Self::permanent(app_id)
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
struct GenerateSchemaData {
    schema: String,
}

#[derive(Debug, Clone, Serialize)]
struct QuerySchemaRequest<'a> {
    schema: &'a str,
    app_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct QuotaRequest<'a> {
    app_id: &'a str,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaInfo {
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
pub struct TermSchemaQuota {
    #[serde(default)]
    pub schema_limit: i64,
    #[serde(default)]
    pub schema_used: i64,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaQuota {
    #[serde(default)]
    pub long_term_schema_quota: TermSchemaQuota,
    #[serde(default)]
    pub short_term_schema_quota: TermSchemaQuota,
}

/// Mini app schema API
pub struct SchemaApi {
    context: Arc<ApiContext>,
}

impl SchemaApi {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self { context }
    }

    /// POST /api/apps/v1/url/generate_schema
    pub async fn generate(&self, request: &GenerateSchemaRequest) -> Result<String, BytedanceError> {
        let data: GenerateSchemaData = self
            .context
            .post_with_client_token(GENERATE_PATH, request)
            .await?;
        Ok(data.schema)
    }

    /// POST /api/apps/v1/url/query_schema
    pub async fn query(&self, app_id: &str, schema: &str) -> Result<SchemaInfo, BytedanceError> {
        self.context
            .post_with_client_token(QUERY_PATH, &QuerySchemaRequest { schema, app_id })
            .await
    }

    /// POST /api/apps/v1/url/query_schema_quota
    pub async fn query_quota(&self, app_id: &str) -> Result<SchemaQuota, BytedanceError> {
        self.context
            .post_with_client_token(QUERY_QUOTA_PATH, &QuotaRequest { app_id })
            .await
    }
}

impl BytedanceApi for SchemaApi {
    fn context(&self) -> &ApiContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "schema"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_permanent_request_serialization() {
        let request = GenerateSchemaRequest::permanent("tt01").path("pages/index");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"app_id": "tt01", "path": "pages/index", "no_expire": true})
        );
    }

    #[test]
    fn test_expiring_request_serialization() {
        let request = GenerateSchemaRequest::expiring("tt01", 1700000000).query("a=1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"app_id": "tt01", "query": "a=1", "no_expire": false, "expire_time": 1700000000})
        );
    }

    #[test]
    fn test_quota_deserialization() {
        let quota: SchemaQuota = serde_json::from_value(json!({
            "long_term_schema_quota": {"schema_limit": 100, "schema_used": 1},
            "short_term_schema_quota": {"schema_limit": 50000, "schema_used": 20}
        }))
        .unwrap();
        assert_eq!(quota.long_term_schema_quota.schema_limit, 100);
        assert_eq!(quota.short_term_schema_quota.schema_used, 20);
    }
}
