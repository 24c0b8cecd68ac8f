// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output rows and the sinks that receive them.

use crate::error::{HarvestError, HarvestResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// One retained snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRow {
    /// Capture date as `MM-DD-YYYY`.
    #[serde(rename = "TIMESTAMP")]
    pub timestamp: String,
    /// Normalized page text.
    #[serde(rename = "TEXT")]
    pub text: String,
}

/// Destination for the rows of a run, written once at the end.
pub trait RecordSink: Send {
    /// Human-readable name of where rows go.
    fn location(&self) -> String;
    /// Write all rows, in order.
    fn write_rows(&mut self, rows: &[HarvestRow]) -> HarvestResult<()>;
}

/// Deterministic output file name for a target page: `output_<host>.csv`.
pub fn output_file_name(target: &Url) -> String {
    format!("output_{}.csv", target.host_str().unwrap_or("unknown"))
}

/// CSV file with a `TIMESTAMP,TEXT` header.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sink named after the target's host inside `dir`.
    pub fn for_target(dir: &Path, target: &Url) -> Self {
        Self::new(dir.join(output_file_name(target)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sink_error(&self, e: impl std::fmt::Display) -> HarvestError {
        HarvestError::Sink {
            location: self.location(),
            reason: e.to_string(),
        }
    }
}

impl RecordSink for CsvSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn write_rows(&mut self, rows: &[HarvestRow]) -> HarvestResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| self.sink_error(e))?;

        // Explicit header so an empty run still produces a well-formed file.
        writer
            .write_record(["TIMESTAMP", "TEXT"])
            .map_err(|e| self.sink_error(e))?;
        for row in rows {
            writer
                .write_record([row.timestamp.as_str(), row.text.as_str()])
                .map_err(|e| self.sink_error(e))?;
        }
        writer.flush().map_err(|e| self.sink_error(e))
    }
}

/// Sink that keeps rows in memory instead of writing a file.
///
/// For library callers that post-process rows themselves, such as diffing
/// two runs or feeding another store. Every call to `write_rows` appends and
/// counts one write, so a finished run shows `writes == 1` and an aborted one
/// `writes == 0`.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Rows received so far, in order.
    pub rows: Vec<HarvestRow>,
    /// Number of `write_rows` calls.
    pub writes: usize,
}

impl RecordSink for MemorySink {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn write_rows(&mut self, rows: &[HarvestRow]) -> HarvestResult<()> {
        self.rows.extend_from_slice(rows);
        self.writes += 1;
        Ok(())
    }
}
