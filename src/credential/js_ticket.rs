use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::keys::CredentialKind;
use super::token::{cache_ttl, JsTicket, ResponseSchema};
use crate::cache::Cache;
use crate::config::Config;
use crate::error::BytedanceError;
use crate::transport::Transport;
use crate::utils::with_query;

const JS_TICKET_PATH: &str = "/js/getticket";

/// Caches the JS-API ticket used to sign web page SDK configs.
///
/// Same locking discipline as [`DefaultCredentialManager`](super::DefaultCredentialManager)
/// but with its own lock, so ticket refreshes never wait on token refreshes.
pub struct JsTicketManager {
    config: Arc<Config>,
    cache: Arc<dyn Cache>,
    transport: Arc<dyn Transport>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for JsTicketManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsTicketManager")
            .field("client_key", &self.config.client_key())
            .finish_non_exhaustive()
    }
}

impl JsTicketManager {
    pub fn new(config: Arc<Config>, cache: Arc<dyn Cache>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            cache,
            transport,
            refresh_lock: Mutex::new(()),
        }
    }

    fn cache_key(&self) -> String {
        CredentialKind::JsTicket.cache_key(self.config.cache_key_prefix(), self.config.client_key())
    }

    async fn cached(&self, key: &str) -> Result<Option<String>, BytedanceError> {
        Ok(self.cache.get(key).await?.filter(|value| !value.is_empty()))
    }

    /// Returns the cached ticket, fetching one with `client_token` on a miss.
    pub async fn ticket(&self, client_token: &str) -> Result<String, BytedanceError> {
        let key = self.cache_key();
        if let Some(ticket) = self.cached(&key).await? {
            return Ok(ticket);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(ticket) = self.cached(&key).await? {
            debug!("[Bytedance] jsapi_ticket refreshed by a concurrent caller");
            return Ok(ticket);
        }

        let ticket = self.fetch(client_token).await?;
        info!("[Bytedance] jsapi_ticket refreshed, expires in {}s", ticket.expires_in);
        match cache_ttl(ticket.expires_in) {
            Some(ttl) => self.cache.set(&key, &ticket.ticket, ttl).await?,
            None => warn!(
                "[Bytedance] jsapi_ticket expires in {}s, too short to cache",
                ticket.expires_in
            ),
        }
        Ok(ticket.ticket)
    }

    /// Fetches a ticket from upstream, bypassing the cache.
    pub async fn fetch(&self, client_token: &str) -> Result<JsTicket, BytedanceError> {
        let url = with_query(
            &self.config.open_url(JS_TICKET_PATH),
            &[("access_token", client_token)],
        );
        let body = self.transport.get(&url).await?;
        let ticket: JsTicket = ResponseSchema::OpenPlatform.decode(&body)?;
        if ticket.ticket.is_empty() {
            return Err(BytedanceError::Token("response carried no ticket".to_string()));
        }
        Ok(ticket)
    }

    pub async fn invalidate(&self) -> Result<(), BytedanceError> {
        self.cache.delete(&self.cache_key()).await
    }
}
