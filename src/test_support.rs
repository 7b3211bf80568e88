//! In-process doubles for the cache and transport seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{Cache, MemoryCache};
use crate::config::Config;
use crate::error::{BytedanceError, HttpError};
use crate::transport::Transport;
use crate::types::{ClientKey, ClientSecret};

pub(crate) fn test_config() -> Arc<Config> {
    Arc::new(
        Config::builder()
            .client_key(ClientKey::new("tt01").unwrap())
            .client_secret(ClientSecret::new("secret01").unwrap())
            .cache_key_prefix("douyin")
            .build()
            .unwrap(),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub access_token: Option<String>,
}

/// Transport answering by URL fragment and counting every call.
#[derive(Default)]
pub(crate) struct StubTransport {
    routes: Vec<(&'static str, Result<Vec<u8>, HttpError>)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Call>>,
    delay: Duration,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, fragment: &'static str, body: serde_json::Value) -> Self {
        self.routes
            .push((fragment, Ok(serde_json::to_vec(&body).unwrap())));
        self
    }

    pub fn raw(mut self, fragment: &'static str, body: &[u8]) -> Self {
        self.routes.push((fragment, Ok(body.to_vec())));
        self
    }

    pub fn fail(mut self, fragment: &'static str, error: HttpError) -> Self {
        self.routes.push((fragment, Err(error)));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Call> {
        self.seen.lock().unwrap().clone()
    }

    async fn reply(&self, call: Call) -> Result<Vec<u8>, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = call.url.clone();
        self.seen.lock().unwrap().push(call);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(HttpError::Other(format!("no route for {url}"))))
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        self.reply(Call {
            url: url.to_string(),
            body: None,
            access_token: None,
        })
        .await
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, HttpError> {
        self.reply(Call {
            url: url.to_string(),
            body: serde_json::from_slice(&body).ok(),
            access_token: None,
        })
        .await
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        self.reply(Call {
            url: url.to_string(),
            body: Some(payload.clone()),
            access_token: None,
        })
        .await
    }

    async fn post_json_with_token(
        &self,
        url: &str,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        self.reply(Call {
            url: url.to_string(),
            body: Some(payload.clone()),
            access_token: Some(access_token.to_string()),
        })
        .await
    }
}

/// [`MemoryCache`] that also records every write with its TTL.
#[derive(Default)]
pub(crate) struct RecordingCache {
    inner: MemoryCache,
    writes: Mutex<Vec<(String, String, Duration)>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value and TTL written under `key`.
    pub fn written(&self, key: &str) -> Option<(String, Duration)> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _, _)| k == key)
            .map(|(_, value, ttl)| (value.clone(), *ttl))
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl Cache for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, BytedanceError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), BytedanceError> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl));
        self.inner.set(key, value, ttl).await
    }

    async fn exists(&self, key: &str) -> Result<bool, BytedanceError> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), BytedanceError> {
        self.inner.delete(key).await
    }
}
