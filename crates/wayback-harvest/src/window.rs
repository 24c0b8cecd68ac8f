// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Retention window and the clock it is computed from.

use crate::timestamp;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Source of the current time. Injected so runs can be reproduced.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The range of captures considered by a run: everything from `cutoff` on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionWindow {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    /// `cutoff` as a 14-digit archive timestamp.
    pub cutoff_timestamp: String,
}

impl RetentionWindow {
    /// Compute the window reaching `years` back from `now`.
    ///
    /// Subtraction is calendar based, so Feb 29 maps to Feb 28.
    pub fn reaching_back(now: DateTime<Utc>, years: u32) -> Self {
        let cutoff = now
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            now,
            cutoff,
            cutoff_timestamp: timestamp::encode(&cutoff),
        }
    }

    /// Whether a raw archive timestamp falls inside the window.
    ///
    /// Fixed-width zero-padded timestamps order lexicographically, so this is
    /// a plain string comparison.
    pub fn contains(&self, raw: &str) -> bool {
        raw >= self.cutoff_timestamp.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_twenty_year_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap();
        let window = RetentionWindow::reaching_back(now, 20);
        assert_eq!(window.cutoff_timestamp, "20061017083000");
        assert!(window.contains("20061017083000"));
        assert!(window.contains("20250101000000"));
        assert!(!window.contains("20061017082959"));
    }

    #[test]
    fn test_leap_day_clamps() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let window = RetentionWindow::reaching_back(now, 1);
        assert_eq!(window.cutoff_timestamp, "20230228000000");
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }
}
