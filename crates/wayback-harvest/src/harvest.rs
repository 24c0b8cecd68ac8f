// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvest orchestrator.
//!
//! A run moves through `Init → Indexing → PerSnapshot → Finalizing → Done`,
//! or to `Aborted` on a fatal error. Snapshots are processed strictly in
//! index order over one rendering context, which is closed on every exit
//! path. Per-snapshot failures are contained in their iteration and never
//! touch the run state.

use crate::config::HarvestConfig;
use crate::dedup::DedupState;
use crate::error::{HarvestError, HarvestResult};
use crate::events::{EventBus, HarvestEvent, SkipReason};
use crate::extract;
use crate::index::{SnapshotIndex, SnapshotRef};
use crate::renderer::{RenderContext, Renderer};
use crate::retry::{self, LoadOutcome, Pause, RetryPolicy, TokioPause};
use crate::sink::{HarvestRow, RecordSink};
use crate::timestamp;
use crate::window::{Clock, RetentionWindow, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    /// Retained rows in processing order.
    pub rows: Vec<HarvestRow>,
    /// Captures inside the retention window.
    pub snapshots_total: usize,
    pub retained: usize,
    pub duplicates: usize,
    /// Snapshots dropped for navigation, extraction or timestamp failures.
    pub skipped: usize,
    /// Where the rows were written.
    pub location: String,
}

/// Orchestrator-local state, discarded at run end.
#[derive(Default)]
struct RunState {
    dedup: DedupState,
    rows: Vec<HarvestRow>,
    duplicates: usize,
    skipped: usize,
}

enum SnapshotOutcome {
    Retained(HarvestRow),
    Skipped(SkipReason, String),
}

/// Drives one harvest run end to end.
pub struct Harvester {
    config: HarvestConfig,
    index: Arc<dyn SnapshotIndex>,
    renderer: Arc<dyn Renderer>,
    clock: Arc<dyn Clock>,
    pause: Arc<dyn Pause>,
    events: EventBus,
}

impl Harvester {
    pub fn new(
        config: HarvestConfig,
        index: Arc<dyn SnapshotIndex>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            index,
            renderer,
            clock: Arc::new(SystemClock),
            pause: Arc::new(TokioPause),
            events: EventBus::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest every retained snapshot of `target` into `sink`.
    ///
    /// Only invalid input, index failure, session failure and sink failure
    /// are returned as errors; nothing is written to `sink` in those cases
    /// except a failing sink itself.
    pub async fn run(
        &self,
        target: &str,
        sink: &mut dyn RecordSink,
    ) -> HarvestResult<HarvestReport> {
        let result = self.run_inner(target, sink).await;
        match &result {
            Ok(report) => {
                enter("done");
                info!(
                    retained = report.retained,
                    duplicates = report.duplicates,
                    skipped = report.skipped,
                    location = %report.location,
                    "harvest complete"
                );
            }
            Err(e) => {
                enter("aborted");
                warn!(error = %e, "harvest aborted");
                self.events.emit(HarvestEvent::RunFailed {
                    error: e.to_string(),
                });
            }
        }
        result
    }

    async fn run_inner(
        &self,
        target: &str,
        sink: &mut dyn RecordSink,
    ) -> HarvestResult<HarvestReport> {
        enter("init");
        let target = validate_target(target)?;
        let window = RetentionWindow::reaching_back(self.clock.now(), self.config.retention_years);
        self.events.emit(HarvestEvent::RunStarted {
            url: target.to_string(),
            cutoff: window.cutoff_timestamp.clone(),
        });

        let mut ctx = self
            .renderer
            .new_context()
            .await
            .map_err(|e| HarvestError::Session(format!("{e:#}")))?;

        let result = self.harvest(ctx.as_mut(), target, &window, sink).await;

        if let Err(e) = ctx.close().await {
            warn!(error = %e, "failed to close rendering context");
        }
        result
    }

    async fn harvest(
        &self,
        ctx: &mut dyn RenderContext,
        target: &str,
        window: &RetentionWindow,
        sink: &mut dyn RecordSink,
    ) -> HarvestResult<HarvestReport> {
        enter("indexing");
        let snapshots = self.index.fetch_snapshots(target, window).await?;
        info!(
            url = target,
            count = snapshots.len(),
            cutoff = %window.cutoff_timestamp,
            "snapshots in window"
        );
        self.events.emit(HarvestEvent::IndexLoaded {
            url: target.to_string(),
            snapshots: snapshots.len(),
        });

        enter("per_snapshot");
        let policy = RetryPolicy {
            max_attempts: self.config.max_attempts,
            delay: self.config.retry_delay,
            timeout: self.config.navigation_timeout,
        };
        let mut state = RunState::default();

        for snapshot in &snapshots {
            match self.process(ctx, target, snapshot, &policy, &mut state).await {
                SnapshotOutcome::Retained(row) => {
                    self.events.emit(HarvestEvent::SnapshotRetained {
                        timestamp: snapshot.timestamp.clone(),
                        date: row.timestamp.clone(),
                        text: row.text.clone(),
                    });
                    state.rows.push(row);
                    self.pause.pause(self.config.snapshot_delay).await;
                }
                SnapshotOutcome::Skipped(reason, detail) => {
                    debug!(timestamp = %snapshot.timestamp, %reason, %detail, "snapshot skipped");
                    if reason == SkipReason::Duplicate {
                        state.duplicates += 1;
                    } else {
                        state.skipped += 1;
                    }
                    self.events.emit(HarvestEvent::SnapshotSkipped {
                        timestamp: snapshot.timestamp.clone(),
                        reason,
                        detail,
                    });
                }
            }
        }

        enter("finalizing");
        sink.write_rows(&state.rows)?;
        let location = sink.location();
        self.events.emit(HarvestEvent::RowsWritten {
            location: location.clone(),
            rows: state.rows.len(),
        });

        Ok(HarvestReport {
            retained: state.rows.len(),
            rows: state.rows,
            snapshots_total: snapshots.len(),
            duplicates: state.duplicates,
            skipped: state.skipped,
            location,
        })
    }

    /// Load, extract and filter one snapshot.
    ///
    /// The dedup state only changes when the snapshot is retained.
    async fn process(
        &self,
        ctx: &mut dyn RenderContext,
        target: &str,
        snapshot: &SnapshotRef,
        policy: &RetryPolicy,
        state: &mut RunState,
    ) -> SnapshotOutcome {
        let date = match timestamp::reformat(&snapshot.timestamp) {
            Ok(date) => date,
            Err(e) => return SnapshotOutcome::Skipped(SkipReason::Format, e.to_string()),
        };

        let replay_url = self.config.replay_url(&snapshot.timestamp, target);
        info!(url = %replay_url, "fetching snapshot");
        self.events.emit(HarvestEvent::SnapshotFetching {
            timestamp: snapshot.timestamp.clone(),
            replay_url: replay_url.clone(),
        });

        if let LoadOutcome::Exhausted {
            attempts,
            last_error,
        } = retry::load(ctx, &replay_url, policy, self.pause.as_ref(), &self.events).await
        {
            let err = HarvestError::Navigation {
                url: replay_url,
                attempts,
                reason: last_error,
            };
            return SnapshotOutcome::Skipped(SkipReason::Navigation, err.to_string());
        }

        let content = match extract::extract(ctx).await {
            Ok(content) => content,
            Err(e) => return SnapshotOutcome::Skipped(SkipReason::Extraction, e.to_string()),
        };

        if !state.dedup.offer(&content.normalized_text) {
            return SnapshotOutcome::Skipped(SkipReason::Duplicate, String::new());
        }

        SnapshotOutcome::Retained(HarvestRow {
            timestamp: date,
            text: content.normalized_text,
        })
    }
}

fn enter(phase: &'static str) {
    debug!(phase, "harvest phase");
}

/// Require an absolute http(s) URL with a host.
pub fn validate_target(raw: &str) -> HarvestResult<&str> {
    let raw = raw.trim();
    let invalid = |reason: String| HarvestError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(raw)
}
