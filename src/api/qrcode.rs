use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::r#trait::{ApiContext, BytedanceApi};
use crate::error::BytedanceError;

const QRCODE_PATH: &str = "/api/apps/qrcode";

/// Host apps a QR code can target.
pub mod host {
    pub const TOUTIAO: &str = "toutiao";
    pub const TOUTIAO_LITE: &str = "toutiao_lite";
    pub const DOUYIN: &str = "douyin";
    pub const DOUYIN_LITE: &str = "douyin_lite";
    pub const PIPIXIA: &str = "pipixia";
    pub const HUOSHAN: &str = "huoshan";
    pub const XIGUA: &str = "xigua";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct QrcodeOptions {
    #[serde(rename = "appname", skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Page path, URL-encoded, with query string if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    pub set_icon: bool,
}

impl QrcodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn line_color(mut self, color: Color) -> Self {
        self.line_color = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn set_icon(mut self, set_icon: bool) -> Self {
        self.set_icon = set_icon;
        self
    }
}

#[derive(Serialize)]
struct QrcodeRequest<'a> {
    access_token: &'a str,
    #[serde(flatten)]
    options: &'a QrcodeOptions,
}

#[derive(Deserialize)]
struct QrcodeError {
    #[serde(default, alias = "err_no")]
    errcode: i64,
    #[serde(default, alias = "err_tips")]
    errmsg: String,
}

/// Mini app QR code API
pub struct QrcodeApi {
    context: Arc<ApiContext>,
}

impl QrcodeApi {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self { context }
    }

    /// Returns the QR code image bytes.
    ///
    /// POST /api/apps/qrcode
    pub async fn fetch_code(&self, options: &QrcodeOptions) -> Result<Vec<u8>, BytedanceError> {
        let access_token = self.context.credentials.server_token().await?;
        let payload = serde_json::to_value(QrcodeRequest {
            access_token: &access_token,
            options,
        })?;

        let body = self
            .context
            .transport
            .post_json(&self.context.config.developer_url(QRCODE_PATH), &payload)
            .await?;
        check_image(body)
    }
}

// Failures come back as a JSON object instead of an image.
fn check_image(body: Vec<u8>) -> Result<Vec<u8>, BytedanceError> {
    if body.first() == Some(&b'{') {
        if let Ok(error) = serde_json::from_slice::<QrcodeError>(&body) {
            BytedanceError::check_api(error.errcode, &error.errmsg)?;
        }
    }
    Ok(body)
}

impl BytedanceApi for QrcodeApi {
    fn context(&self) -> &ApiContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "qrcode"
    }
}
