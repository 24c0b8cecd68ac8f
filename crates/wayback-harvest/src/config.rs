// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Public archive host serving both the CDX index and identity replays.
pub const DEFAULT_ARCHIVE_HOST: &str = "http://web.archive.org";

/// Environment variable overriding Chromium discovery.
pub const CHROMIUM_PATH_ENV: &str = "WAYBACK_HARVEST_CHROMIUM_PATH";

/// Tunables for one harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Scheme and host of the archive, without trailing slash.
    pub archive_host: String,
    /// How far back captures are considered.
    pub retention_years: u32,
    /// Navigation attempts per snapshot.
    pub max_attempts: u32,
    /// Fixed wait between failed navigation attempts.
    pub retry_delay: Duration,
    /// Ceiling for a single navigation attempt, idle wait included.
    pub navigation_timeout: Duration,
    /// Quiet period with no in-flight requests before a page counts as loaded.
    pub network_idle: Duration,
    /// Pause after each retained snapshot.
    pub snapshot_delay: Duration,
    /// Timeout for one index request.
    pub index_timeout: Duration,
    /// Extra index attempts on 5xx or transport errors.
    pub index_retries: u32,
    /// Directory receiving the output file.
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            archive_host: DEFAULT_ARCHIVE_HOST.to_string(),
            retention_years: 20,
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            navigation_timeout: Duration::from_secs(120),
            network_idle: Duration::from_millis(500),
            snapshot_delay: Duration::from_secs(2),
            index_timeout: Duration::from_secs(60),
            index_retries: 2,
            output_dir: PathBuf::from("."),
        }
    }
}

impl HarvestConfig {
    /// The archive's CDX search endpoint.
    pub fn cdx_endpoint(&self) -> String {
        format!("{}/cdx/search/cdx", self.archive_host.trim_end_matches('/'))
    }

    /// Identity replay URL: the capture as originally served, without archive chrome.
    pub fn replay_url(&self, timestamp: &str, target: &str) -> String {
        format!(
            "{}/web/{timestamp}id_/{target}",
            self.archive_host.trim_end_matches('/')
        )
    }
}
