//! Credential payloads and response decoding.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BytedanceError;

/// Seconds subtracted from every upstream lifetime before caching, so a
/// cached credential is never handed out close to its real expiry.
pub const TTL_SAFETY_MARGIN_SECS: i64 = 1500;

/// Cache lifetime for a credential the upstream declared valid for
/// `expires_in` seconds. `None` means the credential must not be cached.
pub fn cache_ttl(expires_in: i64) -> Option<Duration> {
    let secs = expires_in.checked_sub(TTL_SAFETY_MARGIN_SECS)?;
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// User-scoped credential pair issued by the OAuth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    #[serde(default, alias = "openid")]
    pub open_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

impl UserToken {
    pub fn new(
        open_id: impl Into<String>,
        access_token: impl Into<String>,
        expires_in: i64,
        refresh_token: impl Into<String>,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            open_id: open_id.into(),
            access_token: access_token.into(),
            expires_in,
            refresh_token: refresh_token.into(),
            refresh_expires_in,
            scope: String::new(),
        }
    }
}

/// Application-scoped token (client token or server token).
#[derive(Debug, Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct AppToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Result of renewing a refresh token.
#[derive(Debug, Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct RefreshToken {
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct JsTicket {
    #[serde(default)]
    pub ticket: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Envelope layout of a credential endpoint.
///
/// Both layouts nest the payload under `data`; they differ in where the
/// upstream status lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// `open.douyin.com` OAuth endpoints: `data.error_code` / `data.description`.
    OpenPlatform,
    /// `developer.toutiao.com` mini app endpoints: top-level `err_no` / `err_tips`.
    MiniApp,
}

struct StatusField {
    nested: bool,
    code: &'static str,
    messages: &'static [&'static str],
}

// Gateway rejections use the top-level envelope on every host.
const GATEWAY_STATUS: StatusField = StatusField {
    nested: false,
    code: "err_no",
    messages: &["err_tips", "err_msg"],
};

const OAUTH_STATUS: StatusField = StatusField {
    nested: true,
    code: "error_code",
    messages: &["description"],
};

const OPEN_PLATFORM_STATUS: &[StatusField] = &[GATEWAY_STATUS, OAUTH_STATUS];
const MINI_APP_STATUS: &[StatusField] = &[GATEWAY_STATUS];

impl ResponseSchema {
    fn status_fields(self) -> &'static [StatusField] {
        match self {
            ResponseSchema::OpenPlatform => OPEN_PLATFORM_STATUS,
            ResponseSchema::MiniApp => MINI_APP_STATUS,
        }
    }

    /// Decodes `body`, turning a non-zero upstream status into
    /// [`BytedanceError::Api`] and an unreadable body into [`BytedanceError::Json`].
    pub fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, BytedanceError> {
        let mut envelope: Value = serde_json::from_slice(body)?;
        let data = envelope
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null);

        for field in self.status_fields() {
            let scope = if field.nested { &data } else { &envelope };
            let code = status_code(scope.get(field.code));
            if code != 0 {
                let message = field
                    .messages
                    .iter()
                    .find_map(|name| scope.get(*name).and_then(Value::as_str))
                    .unwrap_or_default();
                return Err(BytedanceError::Api {
                    code,
                    message: message.to_string(),
                });
            }
        }

        Ok(serde_json::from_value(data)?)
    }
}

/// Code reported when a status field is present but not a number.
pub(crate) const UNREADABLE_STATUS_CODE: i64 = -1;

// Some gateways quote the code, e.g. `"err_no": "4001"`.
fn status_code(value: Option<&Value>) -> i64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(UNREADABLE_STATUS_CODE),
        Some(Value::String(s)) if s.trim().is_empty() => 0,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(UNREADABLE_STATUS_CODE),
        Some(_) => UNREADABLE_STATUS_CODE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl() {
        assert_eq!(cache_ttl(3600), Some(Duration::from_secs(2100)));
        assert_eq!(cache_ttl(2592000), Some(Duration::from_secs(2590500)));
        assert_eq!(cache_ttl(1501), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_cache_ttl_short_lived_not_cached() {
        assert_eq!(cache_ttl(1500), None);
        assert_eq!(cache_ttl(1000), None);
        assert_eq!(cache_ttl(0), None);
        assert_eq!(cache_ttl(-5), None);
        assert_eq!(cache_ttl(i64::MIN), None);
    }

    #[test]
    fn test_decode_open_platform_success() {
        let body = br#"{"data":{"access_token":"atok-1","expires_in":3600,"refresh_token":"rtok-2","refresh_expires_in":2592000,"error_code":0,"description":""},"message":"success"}"#;
        let token: UserToken = ResponseSchema::OpenPlatform.decode(body).unwrap();
        assert_eq!(token.access_token, "atok-1");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.refresh_token, "rtok-2");
        assert_eq!(token.refresh_expires_in, 2592000);
        assert!(token.open_id.is_empty());
    }

    #[test]
    fn test_decode_open_platform_nested_error() {
        let body = br#"{"data":{"error_code":10008,"description":"refresh_token expired"},"message":"error"}"#;
        let err = ResponseSchema::OpenPlatform
            .decode::<UserToken>(body)
            .unwrap_err();
        assert_eq!(err.api_code(), Some(10008));
        assert!(err.to_string().contains("refresh_token expired"));
    }

    #[test]
    fn test_decode_open_platform_gateway_error() {
        let body = br#"{"err_no":4001,"err_msg":"bad client"}"#;
        let err = ResponseSchema::OpenPlatform.decode::<AppToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(4001));
        assert!(err.to_string().contains("bad client"));
    }

    #[test]
    fn test_decode_mini_app_error() {
        let body = br#"{"err_no":40015,"err_tips":"bad appid","data":{}}"#;
        let err = ResponseSchema::MiniApp.decode::<AppToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(40015));
        assert!(err.to_string().contains("bad appid"));
    }

    #[test]
    fn test_decode_mini_app_success() {
        let body = br#"{"err_no":0,"err_tips":"success","data":{"access_token":"0801121846735352506a356a6","expires_in":7200}}"#;
        let token: AppToken = ResponseSchema::MiniApp.decode(body).unwrap();
        assert_eq!(token.access_token, "0801121846735352506a356a6");
        assert_eq!(token.expires_in, 7200);
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = ResponseSchema::OpenPlatform
            .decode::<AppToken>(b"<html>bad gateway</html>")
            .unwrap_err();
        assert!(matches!(err, BytedanceError::Json(_)));
    }

    #[test]
    fn test_decode_missing_data() {
        let err = ResponseSchema::MiniApp
            .decode::<AppToken>(br#"{"err_no":0}"#)
            .unwrap_err();
        assert!(matches!(err, BytedanceError::Json(_)));
    }

    #[test]
    fn test_decode_quoted_status_code() {
        let body = br#"{"err_no":"4001","err_msg":"bad client"}"#;
        let err = ResponseSchema::OpenPlatform.decode::<AppToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(4001));

        let body = br#"{"err_no":"0","data":{"access_token":"clt","expires_in":7200}}"#;
        let token: AppToken = ResponseSchema::MiniApp.decode(body).unwrap();
        assert_eq!(token.access_token, "clt");
    }

    #[test]
    fn test_decode_unreadable_status_code_is_rejected() {
        let body = br#"{"data":{"error_code":2.5,"description":"odd"}}"#;
        let err = ResponseSchema::OpenPlatform.decode::<UserToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(UNREADABLE_STATUS_CODE));

        let body = br#"{"err_no":"busy","err_tips":"system busy"}"#;
        let err = ResponseSchema::MiniApp.decode::<AppToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(UNREADABLE_STATUS_CODE));
        assert!(err.to_string().contains("system busy"));

        let body = br#"{"err_no":4001.0,"err_msg":"bad client"}"#;
        let err = ResponseSchema::OpenPlatform.decode::<AppToken>(body).unwrap_err();
        assert_eq!(err.api_code(), Some(4001));
    }

    #[test]
    fn test_user_token_accepts_openid_alias() {
        let token: UserToken =
            serde_json::from_str(r#"{"openid":"u9","access_token":"a"}"#).unwrap();
        assert_eq!(token.open_id, "u9");
    }
}
