//! Click-to-find hazard spotting game.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::content::{ContentDocument, Hotspot};
use crate::hint::IdleHintTimer;
use crate::numbers::len_to_u32;
use crate::storage::{KeyValueStore, ProgressStore, StorageKey};

/// Persisted hazard slice. `completed` holds iff every hotspot is found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardState {
    #[serde(default)]
    pub found: BTreeSet<String>,
    #[serde(default)]
    pub completed: bool,
}

impl HazardState {
    /// The slice as currently persisted, restricted to the scene's hotspots.
    #[must_use]
    pub fn stored<S: KeyValueStore>(store: &ProgressStore<S>, content: &ContentDocument) -> Self {
        store
            .read_slice::<Self>(StorageKey::Hazard)
            .map(|state| state.normalized(content))
            .unwrap_or_default()
    }

    /// Drop ids that are not on the scene and re-derive completion.
    #[must_use]
    pub fn normalized(mut self, content: &ContentDocument) -> Self {
        self.found.retain(|id| content.hotspot(id).is_some());
        self.completed = is_cleared(content, self.found.len());
        self
    }

    /// Found ids that exist on the scene.
    #[must_use]
    pub fn found_count(&self, content: &ContentDocument) -> u32 {
        len_to_u32(
            content
                .hotspots()
                .iter()
                .filter(|spot| self.found.contains(&spot.id))
                .count(),
        )
    }
}

fn is_cleared(content: &ContentDocument, found: usize) -> bool {
    let total = content.hotspots().len();
    total > 0 && found == total
}

/// Result of clicking a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealOutcome {
    /// No hotspot with that id on the scene.
    Unknown,
    /// Re-clicked a spot that was already found.
    AlreadyFound,
    /// Newly found; `remaining` spots are left.
    Found { remaining: u32 },
    /// The last spot was found. Reported once per clearance.
    Cleared,
}

/// Owns the hazard slice and the idle-hint timer.
#[derive(Debug, Clone)]
pub struct HazardTracker<S> {
    store: ProgressStore<S>,
    state: HazardState,
    timer: IdleHintTimer,
}

impl<S: KeyValueStore> HazardTracker<S> {
    pub fn load(store: ProgressStore<S>, content: &ContentDocument) -> Self {
        let state = HazardState::stored(&store, content);
        Self {
            store,
            state,
            timer: IdleHintTimer::default(),
        }
    }

    pub const fn state(&self) -> &HazardState {
        &self.state
    }

    pub const fn timer(&self) -> &IdleHintTimer {
        &self.timer
    }

    #[must_use]
    pub fn is_found(&self, id: &str) -> bool {
        self.state.found.contains(id)
    }

    /// Begin watching for inactivity, e.g. when the scene scrolls into view.
    pub fn start_watch(&mut self, now_ms: u64) {
        if self.state.completed {
            self.timer.cancel();
        } else {
            self.timer.arm(now_ms);
        }
    }

    /// Mark a hotspot found. Re-clicks are idempotent.
    pub fn reveal(&mut self, content: &ContentDocument, id: &str, now_ms: u64) -> RevealOutcome {
        let Some(spot) = content.hotspot(id) else {
            return RevealOutcome::Unknown;
        };
        self.timer.hide_prompt();
        if !self.state.found.insert(spot.id.clone()) {
            return RevealOutcome::AlreadyFound;
        }

        let total = content.hotspots().len();
        let found = self.state.found.len();
        let outcome = if !self.state.completed && is_cleared(content, found) {
            self.state.completed = true;
            self.timer.cancel();
            log::info!("all {total} hazards found");
            RevealOutcome::Cleared
        } else {
            self.timer.arm(now_ms);
            RevealOutcome::Found {
                remaining: len_to_u32(total.saturating_sub(found)),
            }
        };
        log::debug!("hazard {id} found ({found}/{total})");
        self.persist();
        outcome
    }

    /// Advance the idle timer. Returns `true` when the hint prompt should appear.
    pub fn poll_hint(&mut self, now_ms: u64) -> bool {
        if self.state.completed {
            self.timer.cancel();
            return false;
        }
        self.timer.poll(now_ms)
    }

    /// First unfound hotspot in document order.
    #[must_use]
    pub fn hint_target<'a>(&self, content: &'a ContentDocument) -> Option<&'a Hotspot> {
        content
            .hotspots()
            .iter()
            .find(|spot| !self.state.found.contains(&spot.id))
    }

    /// Accept the hint: hide the prompt and point at the next unfound spot.
    pub fn take_hint<'a>(&mut self, content: &'a ContentDocument) -> Option<&'a Hotspot> {
        self.timer.dismiss();
        self.hint_target(content)
    }

    /// Start the game over and restart the idle countdown.
    pub fn reset(&mut self, now_ms: u64) {
        self.clear();
        self.persist();
        self.timer.arm(now_ms);
    }

    pub(crate) fn clear(&mut self) {
        self.state = HazardState::default();
        self.timer.dismiss();
    }

    fn persist(&self) {
        self.store.write_slice(StorageKey::Hazard, &self.state);
    }
}
