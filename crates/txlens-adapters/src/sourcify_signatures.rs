//! Sourcify signature database lookup
//!
//! Uses Sourcify's Signature Database API:
//! https://docs.sourcify.dev/docs/api/#/Signature%20Database/get_signature_database_v1_lookup

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use txlens_core::domain::format_selector;
use txlens_core::{PortError, SignatureDirectoryPort};

use crate::http::{is_connectivity_error, CachedHttpClient};

/// Response from Sourcify Signature Database API
#[derive(Debug, Deserialize)]
struct SourcifyResponse {
    ok: bool,
    result: SourcifyResult,
}

#[derive(Debug, Deserialize)]
struct SourcifyResult {
    #[serde(default)]
    function: HashMap<String, Vec<SignatureEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureEntry {
    name: String,
    has_verified_contract: Option<bool>,
}

/// A signature with its verification status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub signature: String,
    pub verified: bool,
}

/// Sourcify signature lookup with spurious connection detection
///
/// Tracks failed requests and marks the API as unavailable after
/// `max_failed_requests` consecutive connectivity failures (timeout,
/// network error, 5xx). While spurious, lookups return no candidates.
#[derive(Debug, Clone)]
pub struct SourcifySignatureDirectory {
    http: CachedHttpClient,
    base_url: String,
    max_failed_requests: usize,
    is_spurious: Arc<AtomicBool>,
    failed_count: Arc<AtomicUsize>,
}

impl SourcifySignatureDirectory {
    pub fn new(http: CachedHttpClient, base_url: impl Into<String>, max_failed_requests: usize) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            max_failed_requests,
            is_spurious: Arc::new(AtomicBool::new(false)),
            failed_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_spurious(&self) -> bool {
        self.is_spurious.load(Ordering::Relaxed)
    }

    pub fn reset_spurious(&self) {
        self.is_spurious.store(false, Ordering::Relaxed);
        self.failed_count.store(0, Ordering::Relaxed);
    }

    fn on_success(&self) {
        self.failed_count.store(0, Ordering::Relaxed);
    }

    fn on_failure(&self, err: &PortError) {
        if !is_connectivity_error(err) {
            return;
        }
        let count = self.failed_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(count, max = self.max_failed_requests, error = %err, "sourcify request failed");
        if count >= self.max_failed_requests {
            warn!(failures = count, "marking sourcify signature database as spurious");
            self.is_spurious.store(true, Ordering::Relaxed);
        }
    }

    /// Signatures for `selector`, verified contracts first.
    pub async fn lookup_info(&self, selector: &str) -> Result<Vec<SignatureInfo>, PortError> {
        if self.is_spurious() {
            debug!(selector, "skipping lookup, sourcify marked as spurious");
            return Ok(Vec::new());
        }

        let selector = normalize_selector(selector);
        let url = format!("{}?function={}&filter=true", self.base_url, selector);

        let body = match self.http.get_json(&url).await {
            Ok(body) => body,
            Err(e) => {
                self.on_failure(&e);
                return Err(e);
            }
        };
        self.on_success();

        if body.is_null() {
            return Ok(Vec::new());
        }
        let response: SourcifyResponse =
            serde_json::from_value(body).map_err(|e| PortError::Malformed(e.to_string()))?;
        if !response.ok {
            return Err(PortError::Malformed("sourcify returned ok=false".to_owned()));
        }

        let mut sigs: Vec<SignatureInfo> = response
            .result
            .function
            .into_iter()
            .filter(|(key, _)| normalize_selector(key) == selector)
            .flat_map(|(_, entries)| entries)
            .map(|e| SignatureInfo {
                signature: e.name,
                verified: e.has_verified_contract.unwrap_or(false),
            })
            .collect();
        // stable: keeps API order within each group
        sigs.sort_by(|a, b| b.verified.cmp(&a.verified));

        debug!(selector = %selector, count = sigs.len(), "sourcify signatures");
        Ok(sigs)
    }
}

#[async_trait]
impl SignatureDirectoryPort for SourcifySignatureDirectory {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        let sigs = self.lookup_info(&format_selector(selector)).await?;
        Ok(sigs.into_iter().map(|s| s.signature).collect())
    }
}

/// Normalize selector to lowercase with 0x prefix
pub(crate) fn normalize_selector(selector: &str) -> String {
    let sel = selector.trim().to_lowercase();
    if sel.starts_with("0x") {
        sel
    } else {
        format!("0x{}", sel)
    }
}
