//! Bytedance (Douyin) Open Platform and Mini App SDK for Rust
//!
//! The heart of the SDK is credential management: user access tokens,
//! application tokens and JS-API tickets are cached with a safety margin
//! before their real expiry and refreshed on demand. Within one process,
//! concurrent callers trigger at most one upstream refresh per miss.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bytedance_sdk::{MicroApp, types::{ClientKey, ClientSecret}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = MicroApp::builder()
//!         .client_key(ClientKey::new("tt1234567890abcdef")?)
//!         .client_secret(ClientSecret::new("your_secret")?)
//!         .redirect_url("https://example.com/oauth/callback")
//!         .scopes("user_info")
//!         .build()?;
//!
//!     // Send the user to the consent page, then exchange the code
//!     println!("{}", app.authorize_url("state")?);
//!     let token = app.user_access_token("code_from_callback").await?;
//!
//!     // Later: cached, refreshed transparently while the refresh token lives
//!     let access_token = app.access_token(&token.open_id).await?;
//!     println!("access token: {}", access_token);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Authorize, link, schema and QR code APIs
//! - [`cache`] - Cache trait with in-memory and Redis backends
//! - [`client`] - Unified [`MicroApp`] client
//! - [`config`] - SDK configuration
//! - [`credential`] - Token caching and refresh
//! - [`error`] - Error types
//! - [`middleware`] - Tower middleware for the HTTP transport
//! - [`transport`] - HTTP transport trait and reqwest implementation
//! - [`types`] - Identifiers and response envelopes
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use bytedance_sdk::BytedanceError;
//!
//! match app.access_token(open_id).await {
//!     Ok(token) => { /* call the API */ }
//!     Err(BytedanceError::NeedsReauthorization { .. }) => {
//!         // send the user through OAuth consent again
//!     }
//!     Err(BytedanceError::Api { code, message }) => {
//!         eprintln!("API error: {} - {}", code, message);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod middleware;
pub mod transport;
pub mod types;
mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{MicroApp, MicroAppBuilder};
pub use config::Config;
pub use credential::{CredentialKind, CredentialProvider, DefaultCredentialManager, UserToken};
pub use error::{BytedanceError, HttpError};

/// SDK version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
