// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for time: the injectable clock and timestamp formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format epoch seconds as RFC3339, falling back to the raw number.
pub fn format_epoch_seconds(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(format_utc_rfc3339)
        .unwrap_or_else(|| seconds.to_string())
}
