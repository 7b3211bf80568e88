//! HTTP transport used for every call to the remote platform.
//!
//! The [`Transport`] trait is the seam: the credential manager and the API
//! façades only see raw response bytes or an [`HttpError`], and never look at
//! the body of a non-2xx response.

use async_trait::async_trait;

use crate::error::HttpError;

mod http;

pub use self::http::{HttpTransport, HttpTransportBuilder};

/// Header carrying an app token on `open.douyin.com/api/apps/v1` calls.
pub const ACCESS_TOKEN_HEADER: &str = "access-token";

/// Raw HTTP capability.
///
/// Any non-2xx status, connection error or timeout must be reported as an
/// [`HttpError`] regardless of the body content.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError>;

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, HttpError>;

    async fn post_json(&self, url: &str, payload: &serde_json::Value)
        -> Result<Vec<u8>, HttpError>;

    /// POSTs `payload` with the [`ACCESS_TOKEN_HEADER`] set.
    async fn post_json_with_token(
        &self,
        url: &str,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError>;
}
