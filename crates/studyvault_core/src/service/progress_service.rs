//! Study progress bookkeeping.
//!
//! # Responsibility
//! - Keep one progress record per document and update it on every study
//!   session.
//! - Join records with the item tree for "continue studying" listings.
//!
//! # Invariants
//! - At most one record per `document_id`.
//! - Progress never exceeds `1.0`.

use crate::model::item::{Item, ItemId};
use crate::model::progress::StudyProgress;
use crate::service::tree_service::ItemTree;
use std::collections::HashSet;

/// Owner of all study-progress records.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    records: Vec<StudyProgress>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tracker from persisted records.
    ///
    /// A repeated `document_id` keeps its first record; the count of
    /// dropped records is returned alongside.
    pub fn from_records(records: Vec<StudyProgress>) -> (Self, usize) {
        let mut seen = HashSet::new();
        let total = records.len();
        let records: Vec<StudyProgress> = records
            .into_iter()
            .filter(|record| seen.insert(record.document_id))
            .collect();
        let dropped = total - records.len();
        (Self { records }, dropped)
    }

    pub fn records(&self) -> &[StudyProgress] {
        &self.records
    }

    pub fn get(&self, document_id: ItemId) -> Option<&StudyProgress> {
        self.records
            .iter()
            .find(|record| record.document_id == document_id)
    }

    /// Adds `minutes` of study time to `document_id`.
    ///
    /// The first session creates the record at the initial progress; later
    /// sessions add one hundredth per minute, clamped at `1.0`.
    pub fn record_study_time(&mut self, document_id: ItemId, minutes: u64) -> StudyProgress {
        if let Some(record) = self.get_mut(document_id) {
            record.add_session(minutes);
            return record.clone();
        }
        let record = StudyProgress::first_session(document_id, minutes);
        self.records.push(record.clone());
        record
    }

    /// Adds `section` to the completed set of an existing record.
    ///
    /// Returns `None` for untracked documents, otherwise whether the section
    /// was newly added.
    pub fn mark_section_completed(
        &mut self,
        document_id: ItemId,
        section: impl Into<String>,
    ) -> Option<bool> {
        let record = self.get_mut(document_id)?;
        Some(record.completed_sections.insert(section.into()))
    }

    /// Most recently studied documents that still exist in `tree`.
    pub fn top_recent(&self, tree: &ItemTree, limit: usize) -> Vec<(Item, StudyProgress)> {
        let mut joined: Vec<(Item, StudyProgress)> = self
            .records
            .iter()
            .filter_map(|record| {
                tree.get(record.document_id)
                    .map(|item| (item.clone(), record.clone()))
            })
            .collect();
        joined.sort_by(|a, b| b.1.last_studied.cmp(&a.1.last_studied));
        joined.truncate(limit);
        joined
    }

    fn get_mut(&mut self, document_id: ItemId) -> Option<&mut StudyProgress> {
        self.records
            .iter_mut()
            .find(|record| record.document_id == document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressTracker;
    use crate::model::progress::StudyProgress;
    use uuid::Uuid;

    #[test]
    fn from_records_keeps_first_record_per_document() {
        let document_id = Uuid::new_v4();
        let first = StudyProgress::first_session(document_id, 5);
        let second = StudyProgress::first_session(document_id, 50);
        let (tracker, dropped) = ProgressTracker::from_records(vec![first.clone(), second]);
        assert_eq!(dropped, 1);
        assert_eq!(tracker.get(document_id), Some(&first));
    }

    #[test]
    fn mark_section_requires_existing_record() {
        let mut tracker = ProgressTracker::new();
        let document_id = Uuid::new_v4();
        assert_eq!(tracker.mark_section_completed(document_id, "ch1"), None);

        tracker.record_study_time(document_id, 1);
        assert_eq!(tracker.mark_section_completed(document_id, "ch1"), Some(true));
        assert_eq!(tracker.mark_section_completed(document_id, "ch1"), Some(false));
    }
}
