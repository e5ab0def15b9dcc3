//! GET-only JSON client with an in-memory, stale-tolerant cache
//!
//! Fresh entries (younger than `cache_refresh_ms`) are served from memory.
//! When the upstream fails and `allow_stale` is set, the last good body for
//! the URL is returned instead of the error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use txlens_core::PortError;

use crate::config::AdapterConfig;

/// Upper bound on cached URLs; the oldest entry is evicted beyond it.
const MAX_CACHED_RESPONSES: usize = 1000;

/// Acquire mutex lock, recovering from poisoned state if necessary.
macro_rules! lock_or_recover {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    };
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    body: Value,
}

#[derive(Debug, Clone)]
pub struct CachedHttpClient {
    client: reqwest::Client,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    refresh: Duration,
    allow_stale: bool,
    capacity: usize,
}

impl CachedHttpClient {
    pub fn new(config: &AdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(config.cache_refresh_ms),
            config.allow_stale,
        ))
    }

    pub fn with_client(client: reqwest::Client, refresh: Duration, allow_stale: bool) -> Self {
        Self {
            client,
            cache: Arc::new(Mutex::new(HashMap::new())),
            refresh,
            allow_stale,
            capacity: MAX_CACHED_RESPONSES,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Fetches `url` as JSON. A `204 No Content` response is `Value::Null`.
    pub async fn get_json(&self, url: &str) -> Result<Value, PortError> {
        {
            let cache = lock_or_recover!(self.cache);
            if let Some(entry) = cache.get(url) {
                if entry.fetched_at.elapsed() < self.refresh {
                    debug!(url, "cache hit");
                    return Ok(entry.body.clone());
                }
            }
        }

        match self.fetch(url).await {
            Ok(body) => {
                let mut cache = lock_or_recover!(self.cache);
                if cache.len() >= self.capacity && !cache.contains_key(url) {
                    let oldest = cache
                        .iter()
                        .min_by_key(|(_, entry)| entry.fetched_at)
                        .map(|(key, _)| key.clone());
                    if let Some(key) = oldest {
                        debug!(url = %key, "evicting cached response");
                        cache.remove(&key);
                    }
                }
                cache.insert(
                    url.to_owned(),
                    CacheEntry {
                        fetched_at: Instant::now(),
                        body: body.clone(),
                    },
                );
                Ok(body)
            }
            Err(e) => {
                if self.allow_stale {
                    let cache = lock_or_recover!(self.cache);
                    if let Some(entry) = cache.get(url) {
                        warn!(url, error = %e, "upstream failed, serving stale response");
                        return Ok(entry.body.clone());
                    }
                }
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, PortError> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if !status.is_success() {
            return Err(PortError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))
    }

    pub fn is_cached(&self, url: &str) -> bool {
        lock_or_recover!(self.cache).contains_key(url)
    }
}

/// True for failures that suggest the service itself is unreachable:
/// transport errors and server-side statuses.
pub fn is_connectivity_error(err: &PortError) -> bool {
    match err {
        PortError::Transport(_) => true,
        PortError::Status(code) => *code >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_classification() {
        assert!(is_connectivity_error(&PortError::Transport("timeout".into())));
        assert!(is_connectivity_error(&PortError::Status(503)));
        assert!(!is_connectivity_error(&PortError::Status(404)));
        assert!(!is_connectivity_error(&PortError::Malformed("x".into())));
    }
}
