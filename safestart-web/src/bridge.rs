//! JavaScript-facing bindings.
//!
//! The page scripts own rendering and timers; they call into these handles on
//! every user event and render whatever JSON comes back.
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::site::{
    Certificate, ExploreCategory, HotspotEditor, LocalStorageStore, Microsite, Season, SurfaceRect,
    create_web_microsite, probe,
};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Maps become plain objects so page scripts can index them directly.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Progress handle for one page load.
#[wasm_bindgen]
pub struct SafeStartApp {
    site: Microsite<LocalStorageStore>,
}

#[wasm_bindgen]
impl SafeStartApp {
    /// # Errors
    /// Returns an error if the bundled content is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        let mut site = create_web_microsite().map_err(|err| {
            log::error!("Failed to open SafeStart progress: {err:#}");
            dom::console_error(&format!("{err:#}"));
            js_error(format!("{err:#}"))
        })?;
        if let Some(now) = dom::now_utc() {
            site.touch_last_visit(now);
        }
        Ok(Self { site })
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn content(&self) -> Result<JsValue, JsValue> {
        to_js(self.site.content())
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn session(&self) -> Result<JsValue, JsValue> {
        to_js(self.site.session())
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) -> bool {
        self.site.toggle_mute()
    }

    /// Returns the winter scenario for the season, or `null`.
    ///
    /// # Errors
    /// Returns an error for an unknown season name.
    #[wasm_bindgen(js_name = selectSeason)]
    pub fn select_season(&mut self, season: &str) -> Result<JsValue, JsValue> {
        let season: Season = season.parse().map_err(js_error)?;
        to_js(&self.site.select_season(season))
    }

    /// # Errors
    /// Returns an error if the item is unknown or the checklist is locked.
    #[wasm_bindgen(js_name = toggleChecklist)]
    pub fn toggle_checklist(&mut self, id: &str) -> Result<bool, JsValue> {
        self.site.toggle_checklist(id).map_err(js_error)
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = showChecklistResult)]
    pub fn show_checklist_result(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.site.show_checklist_result())
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = checklistState)]
    pub fn checklist_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.site.checklist().state())
    }

    /// The saved checklist result with its recommendations, or `null` before
    /// the result has been shown.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = checklistReport)]
    pub fn checklist_report(&self) -> Result<JsValue, JsValue> {
        to_js(&self.site.checklist_report())
    }

    #[wasm_bindgen(js_name = resetChecklist)]
    pub fn reset_checklist(&mut self) {
        self.site.reset_checklist();
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = currentQuestion)]
    pub fn current_question(&self) -> Result<JsValue, JsValue> {
        to_js(&self.site.current_question())
    }

    /// # Errors
    /// Returns an error if the answer is rejected.
    #[wasm_bindgen(js_name = answerQuiz)]
    pub fn answer_quiz(&mut self, option_id: &str) -> Result<JsValue, JsValue> {
        let feedback = self.site.answer_quiz(option_id).map_err(js_error)?;
        to_js(&feedback)
    }

    /// # Errors
    /// Returns an error if the current question is unanswered or the quiz is over.
    #[wasm_bindgen(js_name = advanceQuiz)]
    pub fn advance_quiz(&mut self) -> Result<JsValue, JsValue> {
        let step = self.site.advance_quiz().map_err(js_error)?;
        to_js(&step)
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = quizState)]
    pub fn quiz_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.site.quiz().state())
    }

    #[wasm_bindgen(js_name = habitsToImprove)]
    pub fn habits_to_improve(&self) -> Vec<String> {
        self.site
            .habits_to_improve()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[wasm_bindgen(js_name = resetQuiz)]
    pub fn reset_quiz(&mut self) {
        self.site.reset_quiz();
    }

    #[wasm_bindgen(js_name = startHazardWatch)]
    pub fn start_hazard_watch(&mut self, now_ms: f64) {
        self.site.start_hazard_watch(dom::millis(now_ms));
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = revealHazard)]
    pub fn reveal_hazard(&mut self, id: &str, now_ms: f64) -> Result<JsValue, JsValue> {
        to_js(&self.site.reveal_hazard(id, dom::millis(now_ms)))
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = hazardState)]
    pub fn hazard_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.site.hazard().state())
    }

    #[wasm_bindgen(js_name = pollHint)]
    pub fn poll_hint(&mut self, now_ms: f64) -> bool {
        self.site.poll_hint(dom::millis(now_ms))
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = takeHint)]
    pub fn take_hint(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.site.take_hint())
    }

    #[wasm_bindgen(js_name = resetHazard)]
    pub fn reset_hazard(&mut self, now_ms: f64) {
        self.site.reset_hazard(dom::millis(now_ms));
    }

    /// # Errors
    /// Returns an error for an unknown category or item.
    #[wasm_bindgen(js_name = markOpened)]
    pub fn mark_opened(&mut self, category: &str, id: &str) -> Result<bool, JsValue> {
        let category: ExploreCategory = category.parse().map_err(js_error)?;
        self.site.mark_opened(category, id).map_err(js_error)
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = calculateScore)]
    pub fn calculate_score(&self) -> Result<JsValue, JsValue> {
        to_js(&self.site.calculate_score())
    }

    /// Certificate summary plus its download file name.
    ///
    /// # Errors
    /// Returns an error if the browser clock is unavailable or serialization fails.
    pub fn certificate(&self, display_name: &str) -> Result<JsValue, JsValue> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CertificateView<'a> {
            #[serde(flatten)]
            certificate: &'a Certificate,
            file_name: String,
            points_line: String,
        }

        let issued_on = dom::today_utc().ok_or_else(|| js_error("clock unavailable"))?;
        let certificate = self.site.certificate(display_name, issued_on);
        to_js(&CertificateView {
            file_name: certificate.file_name(),
            points_line: certificate.points_line(),
            certificate: &certificate,
        })
    }

    /// Re-read every slice, e.g. after another tab changed `localStorage`.
    pub fn reload(&mut self) {
        self.site.reload();
        log::debug!("progress reloaded from localStorage");
    }

    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&mut self) {
        self.site.reset_all();
    }

    /// Hotspot editor seeded from the bundled scene.
    #[wasm_bindgen(js_name = hotspotEditor)]
    pub fn hotspot_editor(&self) -> HotspotEditorHandle {
        HotspotEditorHandle {
            editor: HotspotEditor::new(self.site.content().hotspots().to_vec()),
        }
    }
}

/// Authoring handle for repositioning hotspots on the scene.
#[wasm_bindgen]
pub struct HotspotEditorHandle {
    editor: HotspotEditor,
}

#[wasm_bindgen]
impl HotspotEditorHandle {
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: &str) -> bool {
        self.editor.drag_start(id)
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(
        &mut self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Result<JsValue, JsValue> {
        let rect = SurfaceRect::new(left, top, width, height);
        to_js(&self.editor.drag_move(rect, pointer_x, pointer_y))
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) {
        self.editor.drag_end();
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn probe(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Result<JsValue, JsValue> {
        let rect = SurfaceRect::new(left, top, width, height);
        to_js(&probe(rect, pointer_x, pointer_y))
    }

    /// # Errors
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.editor.export_json().map_err(js_error)
    }
}
