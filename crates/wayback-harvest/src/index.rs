// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Snapshot index client for the archive's CDX endpoint.
//!
//! Asks for the timestamp field only. The response is a JSON array of arrays
//! whose first row is a header; every following row is `[timestamp]`.

use crate::config::HarvestConfig;
use crate::error::{HarvestError, HarvestResult};
use crate::window::RetentionWindow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// One archived capture of the target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRef {
    /// 14-digit `YYYYMMDDHHMMSS` capture time.
    pub timestamp: String,
}

/// Anything that can list the captures of a URL.
#[async_trait]
pub trait SnapshotIndex: Send + Sync {
    /// All captures of `url` inside `window`, in the order the index returns them.
    async fn fetch_snapshots(
        &self,
        url: &str,
        window: &RetentionWindow,
    ) -> HarvestResult<Vec<SnapshotRef>>;
}

/// Drop the header row and keep rows inside the window.
///
/// Order is the index's contract and is preserved as received.
pub fn parse_cdx_rows(body: &str, window: &RetentionWindow) -> HarvestResult<Vec<SnapshotRef>> {
    let rows: Vec<Vec<String>> = serde_json::from_str(body).map_err(|e| {
        HarvestError::IndexUnavailable(format!("failed to parse CDX response: {e}"))
    })?;

    let mut snapshots = Vec::new();
    for row in rows.into_iter().skip(1) {
        let timestamp = row.into_iter().next().ok_or_else(|| {
            HarvestError::IndexUnavailable("CDX response contains an empty row".to_string())
        })?;
        if window.contains(&timestamp) {
            snapshots.push(SnapshotRef { timestamp });
        }
    }
    Ok(snapshots)
}

/// CDX client over reqwest.
#[derive(Clone)]
pub struct CdxClient {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl CdxClient {
    /// Create a client for the archive named in `config`.
    pub fn new(config: &HarvestConfig) -> HarvestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.index_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("wayback-harvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarvestError::IndexUnavailable(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.cdx_endpoint(),
            max_retries: config.index_retries,
        })
    }

    /// GET the raw CDX body, retrying 5xx and transport errors with backoff.
    async fn query(&self, url: &str) -> HarvestResult<String> {
        let mut retries = 0u32;

        loop {
            let resp = self
                .client
                .get(&self.endpoint)
                .query(&[("url", url), ("output", "json"), ("fl", "timestamp")])
                .send()
                .await;

            match resp {
                Ok(r) => {
                    let status = r.status();

                    if status.is_server_error() && retries < self.max_retries {
                        retries += 1;
                        warn!(%status, retries, "CDX index returned server error, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(HarvestError::IndexUnavailable(format!(
                            "CDX API returned {status}"
                        )));
                    }

                    return r.text().await.map_err(|e| {
                        HarvestError::IndexUnavailable(format!("failed to read CDX body: {e}"))
                    });
                }
                Err(e) => {
                    if retries < self.max_retries {
                        retries += 1;
                        warn!(error = %e, retries, "CDX request failed, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }
                    return Err(HarvestError::IndexUnavailable(format!(
                        "CDX request failed: {e}"
                    )));
                }
            }
        }
    }
}

fn backoff(retry: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(retry.saturating_sub(1)))
}

#[async_trait]
impl SnapshotIndex for CdxClient {
    async fn fetch_snapshots(
        &self,
        url: &str,
        window: &RetentionWindow,
    ) -> HarvestResult<Vec<SnapshotRef>> {
        debug!(endpoint = %self.endpoint, url, "querying CDX index");
        let body = self.query(url).await?;
        let snapshots = parse_cdx_rows(&body, window)?;
        debug!(
            count = snapshots.len(),
            cutoff = %window.cutoff_timestamp,
            "CDX index filtered to retention window"
        );
        Ok(snapshots)
    }
}
