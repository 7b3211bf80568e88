//! Basic usage example for bytedance-sdk
//!
//! Run with: cargo run --example basic_usage

use bytedance_sdk::{
    types::{ClientKey, ClientSecret},
    MicroApp,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = MicroApp::builder()
        .client_key(ClientKey::new("tt1234567890abcdef")?)
        .client_secret(ClientSecret::new("your_client_secret_here")?)
        .build()?;

    println!("Client created successfully!");
    println!("Client key: {}", app.client_key());

    match app.client_token().await {
        Ok(token) => println!("Client token: {}...", token.chars().take(8).collect::<String>()),
        Err(e) => eprintln!("Failed to get client token: {}", e),
    }

    Ok(())
}
