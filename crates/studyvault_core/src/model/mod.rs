//! Vault domain model.
//!
//! # Responsibility
//! - Define the item, study-progress and sort-order records shared by every
//!   layer of the vault core.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId` that is never reused.
//! - Timestamps are Unix epoch milliseconds.

pub mod item;
pub mod progress;
pub mod sort;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before the epoch collapse to `0` instead of failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
