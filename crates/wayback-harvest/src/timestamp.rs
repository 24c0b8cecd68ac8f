// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Codec for the archive's fixed-width `YYYYMMDDHHMMSS` timestamps.

use crate::error::{HarvestError, HarvestResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Width of an archive timestamp.
pub const TIMESTAMP_LEN: usize = 14;

const ARCHIVE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse a 14-digit archive timestamp.
///
/// Calendar validation is strict: an impossible date such as `20230230...`
/// is rejected instead of rolling over into the next month.
pub fn parse(raw: &str) -> HarvestResult<NaiveDateTime> {
    if raw.len() != TIMESTAMP_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HarvestError::format(raw, "expected exactly 14 digits"));
    }

    // All-ASCII, so byte slicing is safe.
    let field = |start: usize, end: usize| -> u32 {
        raw[start..end]
            .bytes()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
    };

    let (year, month, day) = (field(0, 4) as i32, field(4, 6), field(6, 8));
    let (hour, minute, second) = (field(8, 10), field(10, 12), field(12, 14));

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| HarvestError::format(raw, "date out of range"))?;
    date.and_hms_opt(hour, minute, second)
        .ok_or_else(|| HarvestError::format(raw, "time of day out of range"))
}

/// Format a date as `MM-DD-YYYY`.
pub fn format(date: &NaiveDateTime) -> String {
    date.format("%m-%d-%Y").to_string()
}

/// Encode an instant as a 14-digit archive timestamp (UTC).
pub fn encode(instant: &DateTime<Utc>) -> String {
    instant.format(ARCHIVE_FORMAT).to_string()
}

/// Parse and reformat in one step.
pub fn reformat(raw: &str) -> HarvestResult<String> {
    parse(raw).map(|date| format(&date))
}
