//! Sharing one credential cache between several clients.
//!
//! With the `redis` feature the cache can live in Redis, so every process of
//! a deployment sees the same tokens:
//!
//! Run with: cargo run --example custom_cache --features redis

use std::sync::Arc;

use bytedance_sdk::cache::Cache;
use bytedance_sdk::credential::UserToken;
use bytedance_sdk::types::{ClientKey, ClientSecret};
use bytedance_sdk::MicroApp;

#[cfg(feature = "redis")]
async fn create_cache() -> Result<Arc<dyn Cache>, Box<dyn std::error::Error>> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    Ok(Arc::new(bytedance_sdk::cache::RedisCache::connect(&url).await?))
}

#[cfg(not(feature = "redis"))]
async fn create_cache() -> Result<Arc<dyn Cache>, Box<dyn std::error::Error>> {
    Ok(Arc::new(bytedance_sdk::cache::MemoryCache::new()))
}

fn create_app(cache: Arc<dyn Cache>) -> Result<MicroApp, Box<dyn std::error::Error>> {
    Ok(MicroApp::builder()
        .client_key(ClientKey::new("tt1234567890abcdef")?)
        .client_secret(ClientSecret::new("your_client_secret_here")?)
        .cache_key_prefix("demo")
        .cache(cache)
        .build()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cache = create_cache().await?;
    let web = create_app(Arc::clone(&cache))?;
    let worker = create_app(Arc::clone(&cache))?;

    web.set_access_token(&UserToken::new(
        "demo-open-id",
        "demo-access-token",
        7200,
        "demo-refresh-token",
        2592000,
    ))
    .await?;

    let token = worker.access_token("demo-open-id").await?;
    println!("Worker sees token seeded by web: {}", token);
    println!(
        "Stored under: demo_access_token_demo-open-id ({})",
        cache.exists("demo_access_token_demo-open-id").await?
    );

    Ok(())
}
