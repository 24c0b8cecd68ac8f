// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvest event bus — typed narration of a run.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`HarvestEvent`] values. The CLI subscribes to print progress; tests
//! subscribe to assert on the pipeline. When no subscribers exist, events are
//! silently dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a snapshot produced no row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Every navigation attempt failed.
    Navigation,
    /// The rendered document could not be read.
    Extraction,
    /// The capture timestamp was malformed.
    Format,
    /// Same text as the last retained snapshot.
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigation => write!(f, "navigation failures"),
            Self::Extraction => write!(f, "unreadable document"),
            Self::Format => write!(f, "malformed timestamp"),
            Self::Duplicate => write!(f, "content unchanged"),
        }
    }
}

/// Every event a run emits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HarvestEvent {
    /// The run started and computed its retention window.
    RunStarted { url: String, cutoff: String },
    /// The index returned the captures inside the window.
    IndexLoaded { url: String, snapshots: usize },
    /// A snapshot is about to be loaded.
    SnapshotFetching { timestamp: String, replay_url: String },
    /// A navigation attempt failed.
    NavigationFailed {
        replay_url: String,
        attempt: u32,
        max_attempts: u32,
        error: String,
    },
    /// A snapshot was skipped.
    SnapshotSkipped {
        timestamp: String,
        reason: SkipReason,
        detail: String,
    },
    /// A snapshot's text changed and was kept.
    SnapshotRetained {
        timestamp: String,
        date: String,
        text: String,
    },
    /// Rows were flushed to the sink.
    RowsWritten { location: String, rows: usize },
    /// The run aborted.
    RunFailed { error: String },
}

/// The central event bus for a run.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HarvestEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: HarvestEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<HarvestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = HarvestEvent::SnapshotSkipped {
            timestamp: "20050101000000".to_string(),
            reason: SkipReason::Duplicate,
            detail: String::new(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SnapshotSkipped"));
        assert!(json.contains("duplicate"));

        let parsed: HarvestEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            HarvestEvent::SnapshotSkipped { reason, .. } => {
                assert_eq!(reason, SkipReason::Duplicate)
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        bus.emit(HarvestEvent::RunFailed {
            error: "index down".to_string(),
        });
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(HarvestEvent::IndexLoaded {
            url: "https://example.com".to_string(),
            snapshots: 3,
        });

        match rx.try_recv().unwrap() {
            HarvestEvent::IndexLoaded { snapshots, .. } => assert_eq!(snapshots, 3),
            _ => panic!("wrong event"),
        }
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Navigation.to_string(), "navigation failures");
        assert_eq!(SkipReason::Duplicate.to_string(), "content unchanged");
    }
}
