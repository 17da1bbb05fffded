#![cfg(target_arch = "wasm32")]

use safestart_web::dom;
use safestart_web::site::{
    ExploreCategory, KeyValueStore, LocalStorageStore, Microsite, Season, StorageKey,
    WebContentLoader,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn clear() {
    let storage = dom::local_storage().unwrap();
    for key in StorageKey::ALL {
        storage.remove_item(key.as_str()).unwrap();
    }
}

#[wasm_bindgen_test]
fn local_storage_round_trips_raw_values() {
    clear();
    let store = LocalStorageStore;
    assert_eq!(store.get("stf_season").unwrap(), None);
    store.set("stf_season", "thaw").unwrap();
    assert_eq!(store.get("stf_season").unwrap().as_deref(), Some("thaw"));
    store.remove("stf_season").unwrap();
    assert_eq!(store.get("stf_season").unwrap(), None);
}

#[wasm_bindgen_test]
fn progress_survives_a_page_reload() {
    clear();
    let mut site = Microsite::from_loader(&WebContentLoader, LocalStorageStore).unwrap();
    site.toggle_checklist("c1").unwrap();
    site.mark_opened(ExploreCategory::Controls, "ppe").unwrap();
    site.select_season(Season::Frost);
    let before = site.calculate_score();

    let reloaded = Microsite::from_loader(&WebContentLoader, LocalStorageStore).unwrap();
    assert_eq!(reloaded.calculate_score(), before);
    assert_eq!(reloaded.session().season, Season::Frost);

    let mut reloaded = reloaded;
    reloaded.reset_all();
    let storage = dom::local_storage().unwrap();
    for key in StorageKey::ALL {
        assert_eq!(storage.get_item(key.as_str()).unwrap(), None);
    }
}

#[wasm_bindgen_test]
fn bridge_reports_score_as_plain_object() {
    clear();
    let mut app = safestart_web::SafeStartApp::new().unwrap();
    assert!(app.toggle_checklist("c2").unwrap());
    let score = app.calculate_score().unwrap();
    let earned = js_sys::Reflect::get(&score, &"earnedPoints".into()).unwrap();
    assert_eq!(earned.as_f64(), Some(2.0));
    app.reset_all();
}

#[wasm_bindgen_test]
fn bridge_restores_checklist_report_after_reload() {
    clear();
    let mut app = safestart_web::SafeStartApp::new().unwrap();
    assert!(app.checklist_report().unwrap().is_null());
    app.toggle_checklist("c1").unwrap();
    app.show_checklist_result().unwrap();

    let reopened = safestart_web::SafeStartApp::new().unwrap();
    let report = reopened.checklist_report().unwrap();
    let outcome = js_sys::Reflect::get(&report, &"outcome".into()).unwrap();
    assert_eq!(outcome.as_string().as_deref(), Some("red"));
    let recommendations = js_sys::Reflect::get(&report, &"recommendations".into()).unwrap();
    assert_eq!(js_sys::Array::from(&recommendations).length(), 3);

    let mut stale = app;
    let mut other = reopened;
    other.reset_all();
    stale.reload();
    assert!(stale.checklist_report().unwrap().is_null());
}
