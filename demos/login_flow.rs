//! OAuth login flow: consent URL, code exchange, cached access token.
//!
//! Run with: cargo run --example login_flow -- <authorization code>

use std::time::Duration;

use bytedance_sdk::api::authorize::scope;
use bytedance_sdk::middleware::LoggingMiddleware;
use bytedance_sdk::types::{ClientKey, ClientSecret};
use bytedance_sdk::{BytedanceError, MicroApp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = MicroApp::builder()
        .client_key(ClientKey::new("tt1234567890abcdef")?)
        .client_secret(ClientSecret::new("your_client_secret_here")?)
        .redirect_url("https://example.com/oauth/callback")
        .scopes(scope::user_scope())
        .timeout(Duration::from_secs(10))
        .with_middleware(LoggingMiddleware::new())
        .build()?;

    let Some(code) = std::env::args().nth(1) else {
        println!("Open this URL and pass the returned code as the first argument:");
        println!("{}", app.authorize_url("demo-state")?);
        return Ok(());
    };

    let token = app.user_access_token(&code).await?;
    println!("Authorized open_id: {}", token.open_id);

    match app.access_token(&token.open_id).await {
        Ok(_) => println!("Access token served from cache"),
        Err(BytedanceError::NeedsReauthorization { open_id }) => {
            println!("{} must authorize again", open_id);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
