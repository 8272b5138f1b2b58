//! PDF safety scans.
//!
//! A scan asks an external endpoint to check a file by its public URL. The
//! result is advisory: it is cached per syllabus for the admin to look at
//! and never gates a decision.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use syllabusdb_core::SyllabusId;

use crate::error::{ControlError, Result};

/// Engine counts returned by the scan endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanVerdict {
    /// Engines flagging the file as malicious.
    pub malicious: u32,
    /// Engines flagging the file as suspicious.
    pub suspicious: u32,
    /// Engines reporting the file harmless.
    pub harmless: u32,
    /// Engines that timed out.
    pub timeout: u32,
    /// Engines with no opinion.
    pub undetected: u32,
}

impl ScanVerdict {
    /// Whether any engine flagged the file.
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        self.malicious > 0 || self.suspicious > 0
    }
}

/// State of a syllabus's most recent scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanResult {
    /// Requested, not finished.
    Pending,
    /// The endpoint returned a verdict.
    Complete {
        /// Engine counts.
        verdict: ScanVerdict,
    },
    /// The request or the endpoint failed.
    Failed {
        /// What went wrong.
        error: String,
    },
}

/// Trait for scanning a file by URL.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan the file at `pdf_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint reports an error.
    async fn scan(&self, pdf_url: &str) -> Result<ScanVerdict>;
}

/// HTTP client for the scan endpoint (`GET {base}/scan?url=...`).
#[derive(Debug, Clone)]
pub struct HttpScanner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScanner {
    /// Create a scanner for the endpoint at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        // Scans poll an upstream service and can take a while.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL of the scan endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScanResponse {
    Error { error: String },
    Verdict(ScanVerdict),
}

#[async_trait]
impl Scanner for HttpScanner {
    async fn scan(&self, pdf_url: &str) -> Result<ScanVerdict> {
        let url = format!("{}/scan", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("url", pdf_url)])
            .send()
            .await
            .map_err(|e| ControlError::Outbound(format!("scan request failed: {e}")))?;

        let status = response.status();
        let body = response.json::<ScanResponse>().await;

        match body {
            Ok(ScanResponse::Verdict(verdict)) if status.is_success() => Ok(verdict),
            Ok(ScanResponse::Error { error }) => Err(ControlError::Outbound(error)),
            _ => Err(ControlError::Outbound(format!(
                "scan endpoint returned status {status}"
            ))),
        }
    }
}

/// A scanner for deployments without a scan endpoint. Every scan fails.
#[derive(Debug, Clone, Default)]
pub struct NoopScanner;

#[async_trait]
impl Scanner for NoopScanner {
    async fn scan(&self, pdf_url: &str) -> Result<ScanVerdict> {
        tracing::warn!(pdf_url, "NoopScanner: scan requested but no endpoint configured");
        Err(ControlError::Outbound("no scan endpoint configured".to_string()))
    }
}

/// Latest scan result per syllabus.
#[derive(Debug, Default)]
pub struct ScanCache {
    results: RwLock<HashMap<SyllabusId, ScanResult>>,
}

impl ScanCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result, replacing any earlier one.
    pub fn insert(&self, syllabus_id: SyllabusId, result: ScanResult) {
        self.results.write().insert(syllabus_id, result);
    }

    /// The latest result for a syllabus.
    #[must_use]
    pub fn get(&self, syllabus_id: &SyllabusId) -> Option<ScanResult> {
        self.results.read().get(syllabus_id).cloned()
    }
}
