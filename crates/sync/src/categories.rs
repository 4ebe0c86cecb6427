//! Reference data cache for the category list.
//!
//! Categories are assumed immutable for the lifetime of the client: once
//! stored, the list is served from durable storage and never refetched unless
//! [`CategoryCache::invalidate`] is called.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    client::{Client, ClientError},
    store::{CATEGORIES_KEY, DurableStore},
};

pub struct CategoryCache {
    client: Client,
    store: Arc<dyn DurableStore>,
    fill: Mutex<()>,
}

impl CategoryCache {
    pub fn new(client: Client, store: Arc<dyn DurableStore>) -> Self {
        Self {
            client,
            store,
            fill: Mutex::new(()),
        }
    }

    /// Returns the category list, fetching it only when nothing is cached.
    ///
    /// Concurrent callers that miss wait for the first fetch instead of
    /// issuing their own.
    pub async fn get(&self) -> Result<Vec<String>, ClientError> {
        if let Some(categories) = self.cached() {
            return Ok(categories);
        }

        let _guard = self.fill.lock().await;
        if let Some(categories) = self.cached() {
            return Ok(categories);
        }

        let raw = self
            .client
            .call::<()>(reqwest::Method::GET, "/api/categories", None)
            .await?;
        let categories: Vec<String> = serde_json::from_str(&raw)?;
        if let Err(err) = self.store.set(CATEGORIES_KEY, &raw) {
            tracing::warn!("failed to cache categories: {err}");
        }
        Ok(categories)
    }

    pub fn invalidate(&self) {
        if let Err(err) = self.store.remove(CATEGORIES_KEY) {
            tracing::warn!("failed to drop cached categories: {err}");
        }
    }

    fn cached(&self) -> Option<Vec<String>> {
        let raw = self.store.get(CATEGORIES_KEY)?;
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(categories) => Some(categories),
            Err(err) => {
                tracing::warn!("ignoring unreadable cached categories: {err}");
                None
            }
        }
    }
}
