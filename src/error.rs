use std::sync::Arc;

use thiserror::Error;

/// Transport-level failures: the request never produced a usable 2xx body.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Reqwest(Arc<reqwest::Error>),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        HttpError::Reqwest(Arc::new(e))
    }
}

/// Bytedance SDK error types
#[derive(Debug, Error)]
pub enum BytedanceError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] HttpError),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bytedance API error (code={code}): {message}")]
    Api { code: i64, message: String },

    #[error("no refresh token on record for {open_id}, user must authorize again")]
    NeedsReauthorization { open_id: String },

    #[error("Credential error: {0}")]
    Token(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BytedanceError {
    fn from(e: reqwest::Error) -> Self {
        BytedanceError::Http(e.into())
    }
}

impl BytedanceError {
    /// Turns a non-zero upstream error code into [`BytedanceError::Api`].
    pub fn check_api(code: i64, message: &str) -> Result<(), BytedanceError> {
        if code != 0 {
            return Err(BytedanceError::Api {
                code,
                message: message.to_string(),
            });
        }
        Ok(())
    }

    /// True when the caller has to send the user through the OAuth consent
    /// flow again; retrying will not help.
    pub fn is_reauthorization(&self) -> bool {
        matches!(self, BytedanceError::NeedsReauthorization { .. })
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, BytedanceError::Api { .. })
    }

    /// Upstream error code, if this is an [`BytedanceError::Api`] error.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            BytedanceError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
