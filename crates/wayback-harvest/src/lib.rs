// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wayback Harvest — the text history of a web page, one row per change.
//!
//! Lists a page's captures from the archive index, renders each capture's
//! identity replay in a browser, and keeps a capture only when its text
//! differs from the last one kept.

pub mod config;
pub mod dedup;
pub mod error;
pub mod events;
pub mod extract;
pub mod harvest;
pub mod index;
pub mod renderer;
pub mod retry;
pub mod sink;
pub mod timestamp;
pub mod window;

pub use config::HarvestConfig;
pub use error::{HarvestError, HarvestResult};
pub use events::{EventBus, HarvestEvent, SkipReason};
pub use harvest::{HarvestReport, Harvester};
pub use index::{CdxClient, SnapshotIndex, SnapshotRef};
pub use renderer::{RenderContext, Renderer};
pub use sink::{CsvSink, HarvestRow, MemorySink, RecordSink};
