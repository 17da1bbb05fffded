//! One-minute pre-departure checklist with a traffic-light result.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::constants::MAX_RECOMMENDATIONS;
use crate::content::{ChecklistThresholds, ContentDocument};
use crate::error::TrackerError;
use crate::numbers::len_to_u32;
use crate::storage::{KeyValueStore, ProgressStore, StorageKey};

/// Traffic-light classification of a completed checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistOutcome {
    Green,
    Yellow,
    Red,
}

impl ChecklistOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for ChecklistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted checklist slice. `result` is present iff `completed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistState {
    #[serde(default)]
    pub checked: BTreeSet<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ChecklistOutcome>,
}

impl ChecklistState {
    /// The slice as currently persisted, or an empty checklist.
    #[must_use]
    pub fn stored<S: KeyValueStore>(store: &ProgressStore<S>) -> Self {
        store
            .read_slice::<Self>(StorageKey::Checklist)
            .map(Self::normalized)
            .unwrap_or_default()
    }

    /// Repair a stored slice whose completion flag and result disagree.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.completed != self.result.is_some() {
            self.completed = false;
            self.result = None;
        }
        self
    }

    /// Number of checked ids that are items of `content`.
    #[must_use]
    pub fn checked_count(&self, content: &ContentDocument) -> u32 {
        len_to_u32(
            content
                .checklist
                .iter()
                .filter(|item| self.checked.contains(&item.id))
                .count(),
        )
    }
}

/// Classify by unchecked count against ascending thresholds.
#[must_use]
pub const fn classify(unchecked: u32, thresholds: ChecklistThresholds) -> ChecklistOutcome {
    if unchecked >= thresholds.red {
        ChecklistOutcome::Red
    } else if unchecked >= thresholds.yellow {
        ChecklistOutcome::Yellow
    } else {
        ChecklistOutcome::Green
    }
}

/// Advice for the first three distinct risk categories left unchecked, in document order.
///
/// Categories without an entry in the recommendation table are dropped, so
/// fewer than three lines may come back.
#[must_use]
pub fn recommendations<'a>(
    content: &'a ContentDocument,
    checked: &BTreeSet<String>,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    content
        .checklist
        .iter()
        .filter(|item| !checked.contains(&item.id))
        .map(|item| item.risk_category.as_str())
        .filter(|category| seen.insert(*category))
        .take(MAX_RECOMMENDATIONS)
        .filter_map(|category| content.recommendation(category))
        .collect()
}

/// What the learner sees after asking for the checklist result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistReport {
    pub outcome: ChecklistOutcome,
    pub unchecked: u32,
    pub recommendations: Vec<String>,
}

impl ChecklistReport {
    fn build(content: &ContentDocument, state: &ChecklistState) -> Self {
        let total = len_to_u32(content.checklist.len());
        let unchecked = total.saturating_sub(state.checked_count(content));
        let outcome = classify(unchecked, content.checklist_thresholds);
        let recommendations = if outcome == ChecklistOutcome::Green {
            Vec::new()
        } else {
            recommendations(content, &state.checked)
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        Self {
            outcome,
            unchecked,
            recommendations,
        }
    }
}

/// Owns the checklist slice and re-persists it after every mutation.
#[derive(Debug, Clone)]
pub struct ChecklistTracker<S> {
    store: ProgressStore<S>,
    state: ChecklistState,
}

impl<S: KeyValueStore> ChecklistTracker<S> {
    /// Load the stored slice, falling back to an empty checklist.
    pub fn load(store: ProgressStore<S>) -> Self {
        let state = ChecklistState::stored(&store);
        Self { store, state }
    }

    pub const fn state(&self) -> &ChecklistState {
        &self.state
    }

    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.state.checked.contains(id)
    }

    /// Flip an item. Returns whether it is now checked.
    ///
    /// # Errors
    ///
    /// Fails when the result is already showing or `id` is not a checklist item.
    pub fn toggle(&mut self, content: &ContentDocument, id: &str) -> Result<bool, TrackerError> {
        if self.state.completed {
            return Err(TrackerError::ChecklistLocked);
        }
        if !content.has_checklist_item(id) {
            return Err(TrackerError::UnknownChecklistItem(id.to_string()));
        }
        let now_checked = if self.state.checked.remove(id) {
            false
        } else {
            self.state.checked.insert(id.to_string());
            true
        };
        log::debug!("checklist item {id} checked={now_checked}");
        self.persist();
        Ok(now_checked)
    }

    /// Classify the current answers and mark the checklist completed.
    pub fn show_result(&mut self, content: &ContentDocument) -> ChecklistReport {
        let report = ChecklistReport::build(content, &self.state);
        self.state.completed = true;
        self.state.result = Some(report.outcome);
        log::info!(
            "checklist result {} with {} unchecked",
            report.outcome,
            report.unchecked
        );
        self.persist();
        report
    }

    /// The report for an already-completed checklist, e.g. after a reload.
    #[must_use]
    pub fn report(&self, content: &ContentDocument) -> Option<ChecklistReport> {
        self.state
            .completed
            .then(|| ChecklistReport::build(content, &self.state))
    }

    /// Start the checklist over.
    pub fn reset(&mut self) {
        self.clear();
        self.persist();
    }

    pub(crate) fn clear(&mut self) {
        self.state = ChecklistState::default();
    }

    fn persist(&self) {
        self.store.write_slice(StorageKey::Checklist, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ChecklistItem;
    use crate::storage::MemoryStore;

    fn thresholds() -> ChecklistThresholds {
        ChecklistThresholds { yellow: 3, red: 6 }
    }

    fn content(items: &[(&str, &str)]) -> ContentDocument {
        let mut doc = ContentDocument::default();
        doc.checklist = items
            .iter()
            .map(|(id, category)| ChecklistItem {
                id: (*id).to_string(),
                text: format!("item {id}"),
                risk_category: (*category).to_string(),
            })
            .collect();
        doc.checklist_thresholds = thresholds();
        for category in ["footwear", "attention", "stairs", "lighting"] {
            doc.checklist_recommendations
                .insert(category.to_string(), format!("fix {category}"));
        }
        doc
    }

    fn ten_items() -> ContentDocument {
        content(&[
            ("c1", "footwear"),
            ("c2", "attention"),
            ("c3", "stairs"),
            ("c4", "vehicles"),
            ("c5", "housekeeping"),
            ("c6", "attention"),
            ("c7", "attention"),
            ("c8", "lighting"),
            ("c9", "housekeeping"),
            ("c10", "winter"),
        ])
    }

    #[test]
    fn classification_matches_thresholds() {
        assert_eq!(classify(7, thresholds()), ChecklistOutcome::Red);
        assert_eq!(classify(6, thresholds()), ChecklistOutcome::Red);
        assert_eq!(classify(4, thresholds()), ChecklistOutcome::Yellow);
        assert_eq!(classify(3, thresholds()), ChecklistOutcome::Yellow);
        assert_eq!(classify(2, thresholds()), ChecklistOutcome::Green);
        assert_eq!(classify(0, thresholds()), ChecklistOutcome::Green);
    }

    #[test]
    fn recommendations_take_three_distinct_categories_in_order() {
        let doc = ten_items();
        let recs = recommendations(&doc, &BTreeSet::new());
        assert_eq!(recs, vec!["fix footwear", "fix attention", "fix stairs"]);
    }

    #[test]
    fn unmapped_categories_are_dropped_not_backfilled() {
        let doc = ten_items();
        let checked: BTreeSet<String> = ["c1", "c2", "c3", "c6", "c7"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        // First three distinct unchecked: vehicles, housekeeping, lighting.
        let recs = recommendations(&doc, &checked);
        assert_eq!(recs, vec!["fix lighting"]);
    }

    #[test]
    fn toggle_persists_full_slice_and_flips() {
        let doc = ten_items();
        let store = MemoryStore::new();
        let mut tracker = ChecklistTracker::load(ProgressStore::new(store.clone()));
        assert_eq!(tracker.toggle(&doc, "c1"), Ok(true));
        assert_eq!(tracker.toggle(&doc, "c2"), Ok(true));
        assert_eq!(tracker.toggle(&doc, "c1"), Ok(false));

        let reloaded = ChecklistTracker::load(ProgressStore::new(store));
        assert_eq!(reloaded.state(), tracker.state());
        assert!(reloaded.is_checked("c2"));
        assert!(!reloaded.is_checked("c1"));
    }

    #[test]
    fn toggle_rejects_unknown_items() {
        let doc = ten_items();
        let mut tracker = ChecklistTracker::load(ProgressStore::new(MemoryStore::new()));
        assert_eq!(
            tracker.toggle(&doc, "c99"),
            Err(TrackerError::UnknownChecklistItem("c99".into()))
        );
    }

    #[test]
    fn show_result_locks_until_reset() {
        let doc = ten_items();
        let mut tracker = ChecklistTracker::load(ProgressStore::new(MemoryStore::new()));
        for id in ["c1", "c2", "c3"] {
            tracker.toggle(&doc, id).unwrap();
        }
        let report = tracker.show_result(&doc);
        assert_eq!(report.unchecked, 7);
        assert_eq!(report.outcome, ChecklistOutcome::Red);
        assert_eq!(tracker.state().result, Some(ChecklistOutcome::Red));
        assert_eq!(tracker.toggle(&doc, "c4"), Err(TrackerError::ChecklistLocked));
        assert_eq!(tracker.report(&doc), Some(report));

        tracker.reset();
        assert_eq!(tracker.state(), &ChecklistState::default());
        assert!(tracker.report(&doc).is_none());
        assert_eq!(tracker.toggle(&doc, "c4"), Ok(true));
    }

    #[test]
    fn all_checked_is_green_without_recommendations() {
        let doc = ten_items();
        let mut tracker = ChecklistTracker::load(ProgressStore::new(MemoryStore::new()));
        for item in &doc.checklist {
            tracker.toggle(&doc, &item.id).unwrap();
        }
        let report = tracker.show_result(&doc);
        assert_eq!(report.outcome, ChecklistOutcome::Green);
        assert_eq!(report.unchecked, 0);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn inconsistent_stored_slice_is_normalized() {
        let store = MemoryStore::new();
        store
            .set(
                StorageKey::Checklist.as_str(),
                r#"{"checked":["c1"],"completed":true}"#,
            )
            .unwrap();
        let tracker = ChecklistTracker::load(ProgressStore::new(store));
        assert!(!tracker.state().completed);
        assert!(tracker.state().result.is_none());
        assert!(tracker.is_checked("c1"));
    }

    #[test]
    fn stored_wire_format_uses_arrays_and_lowercase_result() {
        let state = ChecklistState {
            checked: ["c2", "c1"].iter().map(|s| (*s).to_string()).collect(),
            completed: true,
            result: Some(ChecklistOutcome::Yellow),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"checked":["c1","c2"],"completed":true,"result":"yellow"}"#
        );
    }
}
