//! Web-specific microsite implementation
//!
//! This module provides browser implementations of the safestart-core
//! ports and re-exports the core types.

// Re-export all types from safestart-core
pub use safestart_core::*;

use crate::dom;

const CONTENT_JSON: &str = include_str!("../static/assets/data/content.json");
const RANKS_JSON: &str = include_str!("../static/assets/data/ranks.json");

/// Content loader backed by the documents bundled into the wasm binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebContentLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebContentError {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentLoader for WebContentLoader {
    type Error = WebContentError;

    fn load_content(&self) -> Result<ContentDocument, Self::Error> {
        Ok(ContentDocument::from_json(CONTENT_JSON)?)
    }

    fn load_ranks(&self) -> Result<Option<RankTable>, Self::Error> {
        Ok(Some(RankTable::from_json(RANKS_JSON)?))
    }
}

/// Key-value store over `window.localStorage`.
///
/// The handle is looked up on every call, so a store that becomes
/// unavailable mid-session fails per call instead of poisoning the tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, WebStorageError> {
        dom::local_storage().map_err(|err| WebStorageError::Unavailable(dom::js_error_message(&err)))
    }
}

fn storage_error(err: &wasm_bindgen::JsValue) -> WebStorageError {
    WebStorageError::Storage(dom::js_error_message(err))
}

impl KeyValueStore for LocalStorageStore {
    type Error = WebStorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::storage()?.get_item(key).map_err(|e| storage_error(&e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| storage_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| storage_error(&e))
    }
}

/// Create a browser microsite with `WebContentLoader` and `LocalStorageStore`
///
/// # Errors
///
/// Returns an error if the bundled content or rank table is invalid.
pub fn create_web_microsite() -> anyhow::Result<Microsite<LocalStorageStore>> {
    Microsite::from_loader(&WebContentLoader, LocalStorageStore)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_content_loads_and_validates() {
        let content = WebContentLoader.load_content().unwrap();
        assert_eq!(content.quiz.len(), 8);
        assert_eq!(content.hotspots().len(), 6);
        assert_eq!(content.checklist.len(), 10);
        assert_eq!(content.winter_scenarios.len(), 3);
    }

    #[test]
    fn bundled_rank_table_matches_stock_titles() {
        let ranks = WebContentLoader.load_ranks().unwrap().unwrap();
        assert_eq!(ranks, RankTable::default());
    }

    #[test]
    fn loader_builds_a_site_over_any_store() {
        let site = Microsite::from_loader(&WebContentLoader, MemoryStore::new()).unwrap();
        let score = site.calculate_score();
        assert_eq!(score.max_points, 197);
        assert_eq!(score.rank_title, "Beginner");
    }
}
