//! Per-document study progress record.
//!
//! # Invariants
//! - At most one record exists per `document_id` (enforced by the tracker).
//! - `progress` stays within `[0.0, 1.0]`.
//! - `total_time_spent` never decreases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::item::ItemId;
use super::now_epoch_ms;

/// Progress assigned to a document on its first study session.
pub const INITIAL_PROGRESS: f64 = 0.1;
/// Progress gained per studied minute after the first session.
pub const PROGRESS_PER_MINUTE: f64 = 0.01;

/// Durable study metrics for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyProgress {
    /// Record id, distinct from the tracked document id.
    pub id: Uuid,
    pub document_id: ItemId,
    pub progress: f64,
    /// Accumulated minutes.
    pub total_time_spent: u64,
    /// Epoch ms of the latest recorded session.
    pub last_studied: i64,
    #[serde(default)]
    pub completed_sections: BTreeSet<String>,
}

impl StudyProgress {
    /// Record for a document studied for the first time.
    pub fn first_session(document_id: ItemId, minutes: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            progress: INITIAL_PROGRESS,
            total_time_spent: minutes,
            last_studied: now_epoch_ms(),
            completed_sections: BTreeSet::new(),
        }
    }

    /// Adds another session of `minutes` to this record.
    pub fn add_session(&mut self, minutes: u64) {
        self.total_time_spent = self.total_time_spent.saturating_add(minutes);
        let gained = minutes as f64 * PROGRESS_PER_MINUTE;
        self.progress = clamp_progress(self.progress + gained);
        self.last_studied = now_epoch_ms().max(self.last_studied);
    }
}

/// Clamps to `[0.0, 1.0]`; NaN collapses to `0.0`.
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
