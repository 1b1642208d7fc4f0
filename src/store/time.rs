//! Timestamp helpers for the notification store.
//!
//! The store records timestamps as fractional seconds since the Cocoa
//! reference date (2001-01-01 00:00:00 UTC), not the Unix epoch. Every
//! comparison between "now" and a stored timestamp must happen in the
//! store's epoch.

use chrono::Utc;

/// Offset of the store epoch from the Unix epoch, in seconds.
pub const STORE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Current wall-clock time in the store epoch, as fractional seconds.
#[inline]
pub fn now_in_store_epoch() -> f64 {
    let now = Utc::now();
    (now.timestamp() - STORE_EPOCH_OFFSET_SECS) as f64
        + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Seconds elapsed since a store-epoch timestamp.
#[inline]
pub fn age_seconds(timestamp: f64) -> f64 {
    now_in_store_epoch() - timestamp
}
