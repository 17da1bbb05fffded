//! Opened-panel tracking across the explorable categories.
//!
//! All five categories share one tracker keyed by [`ExploreCategory`]; sets
//! only grow until a global reset.
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::content::{ContentDocument, Season};
use crate::error::TrackerError;
use crate::numbers::len_to_u32;
use crate::storage::{KeyValueStore, ProgressStore, StorageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExploreCategory {
    #[serde(rename = "arkadyHabits")]
    Habits,
    Risks,
    Controls,
    SafeStartStates,
    Seasons,
}

impl ExploreCategory {
    pub const ALL: [Self; 5] = [
        Self::Habits,
        Self::Risks,
        Self::Controls,
        Self::SafeStartStates,
        Self::Seasons,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Habits => "arkadyHabits",
            Self::Risks => "risks",
            Self::Controls => "controls",
            Self::SafeStartStates => "safeStartStates",
            Self::Seasons => "seasons",
        }
    }
}

impl fmt::Display for ExploreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExploreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| format!("unknown explore category `{s}`"))
    }
}

/// Persisted explore slice: one set of opened ids per category.
///
/// Each field is read leniently: a field that is not an array degrades to an
/// empty set without discarding its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreState {
    #[serde(default, deserialize_with = "lenient_ids")]
    pub arkady_habits: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub risks: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub controls: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub safe_start_states: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub seasons: BTreeSet<String>,
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    })
}

impl ExploreState {
    /// The slice as currently persisted, or empty sets.
    #[must_use]
    pub fn stored<S: KeyValueStore>(store: &ProgressStore<S>) -> Self {
        store
            .read_slice::<Self>(StorageKey::Explore)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn opened(&self, category: ExploreCategory) -> &BTreeSet<String> {
        match category {
            ExploreCategory::Habits => &self.arkady_habits,
            ExploreCategory::Risks => &self.risks,
            ExploreCategory::Controls => &self.controls,
            ExploreCategory::SafeStartStates => &self.safe_start_states,
            ExploreCategory::Seasons => &self.seasons,
        }
    }

    const fn opened_mut(&mut self, category: ExploreCategory) -> &mut BTreeSet<String> {
        match category {
            ExploreCategory::Habits => &mut self.arkady_habits,
            ExploreCategory::Risks => &mut self.risks,
            ExploreCategory::Controls => &mut self.controls,
            ExploreCategory::SafeStartStates => &mut self.safe_start_states,
            ExploreCategory::Seasons => &mut self.seasons,
        }
    }

    /// Opened ids in `category` that exist in `content`.
    #[must_use]
    pub fn opened_count(&self, content: &ContentDocument, category: ExploreCategory) -> u32 {
        let opened = self.opened(category);
        len_to_u32(
            content
                .explorable_ids(category)
                .into_iter()
                .filter(|id| opened.contains(*id))
                .count(),
        )
    }

    /// Opened ids across every category that exist in `content`.
    #[must_use]
    pub fn total_opened(&self, content: &ContentDocument) -> u32 {
        ExploreCategory::ALL
            .iter()
            .map(|category| self.opened_count(content, *category))
            .sum()
    }
}

/// Owns the explore slice and persists it whenever a set grows.
#[derive(Debug, Clone)]
pub struct ExploreTracker<S> {
    store: ProgressStore<S>,
    state: ExploreState,
}

impl<S: KeyValueStore> ExploreTracker<S> {
    pub fn load(store: ProgressStore<S>) -> Self {
        let state = ExploreState::stored(&store);
        Self { store, state }
    }

    pub const fn state(&self) -> &ExploreState {
        &self.state
    }

    #[must_use]
    pub fn is_opened(&self, category: ExploreCategory, id: &str) -> bool {
        self.state.opened(category).contains(id)
    }

    /// Record that an item was opened. Returns `true` the first time only.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not an item of `category` in `content`.
    pub fn mark_opened(
        &mut self,
        content: &ContentDocument,
        category: ExploreCategory,
        id: &str,
    ) -> Result<bool, TrackerError> {
        if !content.is_explorable(category, id) {
            return Err(TrackerError::UnknownExploreItem {
                category: category.as_str(),
                id: id.to_string(),
            });
        }
        Ok(self.insert(category, id))
    }

    /// Record a season selection for explore credit.
    pub fn mark_season(&mut self, season: Season) -> bool {
        self.insert(ExploreCategory::Seasons, season.as_str())
    }

    fn insert(&mut self, category: ExploreCategory, id: &str) -> bool {
        let set = self.state.opened_mut(category);
        if set.contains(id) {
            return false;
        }
        set.insert(id.to_string());
        log::debug!("explore {category} opened {id}");
        self.store.write_slice(StorageKey::Explore, &self.state);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.state = ExploreState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Habit, Risk};
    use crate::storage::MemoryStore;

    fn doc() -> ContentDocument {
        let mut doc = ContentDocument::default();
        doc.arkady.habits = ["eyes", "rail"]
            .iter()
            .map(|id| Habit {
                id: (*id).to_string(),
                title: (*id).to_string(),
                body: String::new(),
                icon: String::new(),
            })
            .collect();
        doc.risks = vec![Risk {
            id: "slips".into(),
            icon: String::new(),
            title: "Slips".into(),
            body: String::new(),
        }];
        doc
    }

    #[test]
    fn marking_twice_equals_marking_once_in_every_category() {
        let doc = doc();
        let ids = [
            (ExploreCategory::Habits, "eyes"),
            (ExploreCategory::Risks, "slips"),
            (ExploreCategory::Seasons, "frost"),
        ];
        let mut once = ExploreTracker::load(ProgressStore::new(MemoryStore::new()));
        let mut twice = ExploreTracker::load(ProgressStore::new(MemoryStore::new()));
        for (category, id) in ids {
            assert_eq!(once.mark_opened(&doc, category, id), Ok(true));
            assert_eq!(twice.mark_opened(&doc, category, id), Ok(true));
            assert_eq!(twice.mark_opened(&doc, category, id), Ok(false));
        }
        assert_eq!(once.state(), twice.state());
        assert_eq!(twice.state().total_opened(&doc), 3);
    }

    #[test]
    fn unknown_items_are_rejected() {
        let doc = doc();
        let mut tracker = ExploreTracker::load(ProgressStore::new(MemoryStore::new()));
        assert!(matches!(
            tracker.mark_opened(&doc, ExploreCategory::Controls, "ppe"),
            Err(TrackerError::UnknownExploreItem { category: "controls", .. })
        ));
    }

    #[test]
    fn categories_parse_from_wire_names() {
        for category in ExploreCategory::ALL {
            assert_eq!(category.as_str().parse(), Ok(category));
        }
        assert!("habits".parse::<ExploreCategory>().is_err());
    }

    #[test]
    fn seasons_are_tracked_by_wire_name() {
        let mut tracker = ExploreTracker::load(ProgressStore::new(MemoryStore::new()));
        assert!(tracker.mark_season(Season::Thaw));
        assert!(!tracker.mark_season(Season::Thaw));
        assert!(tracker.is_opened(ExploreCategory::Seasons, "thaw"));
    }

    #[test]
    fn sets_persist_and_reload() {
        let doc = doc();
        let store = MemoryStore::new();
        let mut tracker = ExploreTracker::load(ProgressStore::new(store.clone()));
        tracker
            .mark_opened(&doc, ExploreCategory::Habits, "rail")
            .unwrap();
        tracker.mark_season(Season::Snow);
        let reloaded = ExploreTracker::load(ProgressStore::new(store.clone()));
        assert_eq!(reloaded.state(), tracker.state());
        assert_eq!(
            store.get(StorageKey::Explore.as_str()).unwrap().as_deref(),
            Some(
                r#"{"arkadyHabits":["rail"],"risks":[],"controls":[],"safeStartStates":[],"seasons":["snow"]}"#
            )
        );
    }

    #[test]
    fn malformed_fields_degrade_individually() {
        let store = MemoryStore::new();
        store
            .set(
                StorageKey::Explore.as_str(),
                r#"{"arkadyHabits":"oops","risks":["slips",4],"seasons":null}"#,
            )
            .unwrap();
        let tracker = ExploreTracker::load(ProgressStore::new(store));
        assert!(tracker.state().arkady_habits.is_empty());
        assert_eq!(tracker.state().risks.len(), 1);
        assert!(tracker.state().seasons.is_empty());
        assert!(tracker.state().controls.is_empty());
    }

    #[test]
    fn stale_ids_do_not_count() {
        let doc = doc();
        let mut state = ExploreState::default();
        state.arkady_habits.insert("eyes".into());
        state.arkady_habits.insert("retired-habit".into());
        assert_eq!(state.opened_count(&doc, ExploreCategory::Habits), 1);
    }
}
