//! Per-visitor session preferences: mute flag, chosen season, last visit.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Season;
use crate::storage::{KeyValueStore, ProgressStore, StorageKey};

/// Session settings handed to consumers instead of ambient globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sound starts muted until the visitor opts in.
    pub muted: bool,
    pub season: Season,
    pub last_visit: Option<DateTime<Utc>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            muted: true,
            season: Season::default(),
            last_visit: None,
        }
    }
}

/// Persists each session field under its own scalar key.
#[derive(Debug, Clone)]
pub struct SessionTracker<S> {
    store: ProgressStore<S>,
    config: SessionConfig,
}

impl<S: KeyValueStore> SessionTracker<S> {
    pub fn load(store: ProgressStore<S>) -> Self {
        let muted = store
            .read_raw(StorageKey::Mute)
            .is_none_or(|raw| raw == "true");
        let season = store
            .read_raw(StorageKey::Season)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let last_visit = store
            .read_raw(StorageKey::LastVisit)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|ts| ts.with_timezone(&Utc));
        Self {
            store,
            config: SessionConfig {
                muted,
                season,
                last_visit,
            },
        }
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn last_visit(&self) -> Option<DateTime<Utc>> {
        self.config.last_visit
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
        self.store
            .write_raw(StorageKey::Mute, if muted { "true" } else { "false" });
    }

    /// Flip the mute flag and return the new value.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.config.muted;
        self.set_muted(muted);
        muted
    }

    pub fn select_season(&mut self, season: Season) {
        self.config.season = season;
        self.store.write_raw(StorageKey::Season, season.as_str());
    }

    /// Record a visit at `now`, returning the previous visit if one was stored.
    pub fn touch_last_visit(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let previous = self.config.last_visit.replace(now);
        self.store.write_raw(
            StorageKey::LastVisit,
            &now.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        previous
    }

    pub(crate) fn clear(&mut self) {
        self.config = SessionConfig::default();
    }
}
