// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for a harvest run.
//!
//! Errors split into two classes. Fatal errors abort the run before anything
//! is written; per-snapshot errors are contained inside one loop iteration and
//! only cause that snapshot to be skipped.

/// All errors that can occur while harvesting a page's history.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("Snapshot index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Navigation to {url} failed after {attempts} attempt(s): {reason}")]
    Navigation {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Content extraction failed: {0}")]
    Extraction(String),

    #[error("Malformed archive timestamp {raw:?}: {reason}")]
    Format { raw: String, reason: String },

    #[error("Rendering session unavailable: {0}")]
    Session(String),

    #[error("Failed to write rows to {location}: {reason}")]
    Sink { location: String, reason: String },

    #[error("Invalid target URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl HarvestError {
    /// Whether this error aborts the whole run rather than a single snapshot.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::IndexUnavailable(_)
            | Self::Session(_)
            | Self::Sink { .. }
            | Self::InvalidUrl { .. } => true,
            Self::Navigation { .. } | Self::Extraction(_) | Self::Format { .. } => false,
        }
    }

    pub(crate) fn format(raw: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for harvest results.
pub type HarvestResult<T> = Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(HarvestError::IndexUnavailable("down".into()).is_fatal());
        assert!(HarvestError::Session("no chromium".into()).is_fatal());
        assert!(!HarvestError::Extraction("no body".into()).is_fatal());
        assert!(!HarvestError::format("2023", "too short").is_fatal());
        assert!(!HarvestError::Navigation {
            url: "http://web.archive.org/web/1id_/x".into(),
            attempts: 3,
            reason: "timeout".into(),
        }
        .is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = HarvestError::format("2023061514", "expected 14 digits");
        assert_eq!(
            err.to_string(),
            "Malformed archive timestamp \"2023061514\": expected 14 digits"
        );
    }
}
