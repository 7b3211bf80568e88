//! Douyin open platform and mini app API modules
//!
//! - [`authorize`] - OAuth consent URLs, authorization-code exchange, mini app login
//! - [`link`] - URL links that open the mini app
//! - [`schema`] - Schema links that open the mini app
//! - [`qrcode`] - Mini app QR codes
//!
//! All façades share an [`ApiContext`] and obtain access tokens from its
//! [`CredentialProvider`](crate::credential::CredentialProvider).

pub mod authorize;
pub mod link;
pub mod qrcode;
pub mod schema;
pub mod r#trait;

pub use authorize::{scope, AuthorizeApi, CodeToSession};
pub use link::{GenerateLinkRequest, LinkApi, LinkInfo, UrlLinkQuota};
pub use qrcode::{Color, QrcodeApi, QrcodeOptions};
pub use r#trait::{ApiContext, BytedanceApi};
pub use schema::{GenerateSchemaRequest, SchemaApi, SchemaInfo, SchemaQuota, TermSchemaQuota};
