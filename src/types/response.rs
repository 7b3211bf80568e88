use serde::Deserialize;

use crate::error::BytedanceError;

/// Envelope shared by the `open.douyin.com/api/apps/v1` endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonResponse<T> {
    #[serde(default)]
    pub err_no: i64,
    #[serde(default, alias = "err_tips")]
    pub err_msg: String,
    #[serde(default)]
    pub log_id: String,
    pub data: Option<T>,
}

impl<T> CommonResponse<T> {
    pub fn is_success(&self) -> bool {
        self.err_no == 0
    }

    /// Returns the payload, or the upstream error when `err_no != 0`.
    pub fn into_data(self) -> Result<T, BytedanceError> {
        BytedanceError::check_api(self.err_no, &self.err_msg)?;
        self.data
            .ok_or_else(|| BytedanceError::Json(serde::de::Error::missing_field("data")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        url_link: String,
    }

    #[test]
    fn test_common_response_success() {
        let json = r#"{"err_no":0,"err_msg":"","log_id":"2023","data":{"url_link":"https://z.douyin.com/abc"}}"#;
        let response: CommonResponse<Payload> = serde_json::from_str(json).unwrap();
        assert!(response.is_success());
        assert_eq!(response.into_data().unwrap().url_link, "https://z.douyin.com/abc");
    }

    #[test]
    fn test_common_response_error() {
        let json = r#"{"err_no":28001005,"err_tips":"access_token expired"}"#;
        let response: CommonResponse<Payload> = serde_json::from_str(json).unwrap();
        assert!(!response.is_success());
        let err = response.into_data().unwrap_err();
        assert_eq!(err.api_code(), Some(28001005));
    }

    #[test]
    fn test_common_response_without_data_is_decode_failure() {
        let response: CommonResponse<Payload> =
            serde_json::from_str(r#"{"err_no":0,"err_msg":"success"}"#).unwrap();
        let err = response.into_data().unwrap_err();
        assert!(matches!(err, BytedanceError::Json(_)));
        assert!(err.to_string().contains("data"));
    }
}
