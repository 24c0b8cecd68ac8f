// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Consecutive-duplicate suppression.
//!
//! A candidate is compared only with the most recently retained text, so
//! content that returns after an intervening change is kept again.

/// Whether `candidate` differs from the last retained text.
///
/// With nothing retained yet every candidate passes.
pub fn should_retain(candidate: &str, last_retained: Option<&str>) -> bool {
    last_retained != Some(candidate)
}

/// Last retained text for one run.
#[derive(Debug, Clone, Default)]
pub struct DedupState {
    last_retained: Option<String>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate; records it and returns `true` when it is retained.
    pub fn offer(&mut self, candidate: &str) -> bool {
        if !should_retain(candidate, self.last_retained.as_deref()) {
            return false;
        }
        self.last_retained = Some(candidate.to_string());
        true
    }

    pub fn last_retained(&self) -> Option<&str> {
        self.last_retained.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retained<'a>(seq: &[&'a str]) -> Vec<&'a str> {
        let mut state = DedupState::new();
        seq.iter().copied().filter(|c| state.offer(c)).collect()
    }

    #[test]
    fn test_collapses_runs() {
        assert_eq!(retained(&["a", "a", "b", "b", "b", "a"]), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_oscillation_keeps_every_transition() {
        assert_eq!(retained(&["a", "b", "a", "b"]), vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn test_first_always_retained() {
        assert!(should_retain("hello", None));
        assert!(should_retain("", None));
        assert_eq!(retained(&["x"]), vec!["x"]);
    }

    #[test]
    fn test_rejection_leaves_state() {
        let mut state = DedupState::new();
        assert!(state.offer("a"));
        assert!(!state.offer("a"));
        assert_eq!(state.last_retained(), Some("a"));
    }
}
