//! Centralized scoring weights and timing constants for SafeStart progress logic.
//!
//! Point weights live here, not in the content document.

// Storage keys -------------------------------------------------------------
pub(crate) const KEY_MUTE: &str = "stf_mute";
pub(crate) const KEY_CHECKLIST: &str = "stf_checklist_state";
pub(crate) const KEY_QUIZ: &str = "stf_quiz_state";
pub(crate) const KEY_HAZARD: &str = "stf_hazard_state";
pub(crate) const KEY_EXPLORE: &str = "stf_explore_state";
pub(crate) const KEY_SEASON: &str = "stf_season";
pub(crate) const KEY_LAST_VISIT: &str = "stf_last_visit";

// Point weights ------------------------------------------------------------
pub const POINTS_QUIZ_CORRECT: u32 = 10;
pub const POINTS_HAZARD_FOUND: u32 = 10;
pub const POINTS_HAZARD_ALL_BONUS: u32 = 10;
pub const POINTS_CHECKLIST_ITEM: u32 = 2;
pub const POINTS_CHECKLIST_COMPLETED_BONUS: u32 = 5;
pub const POINTS_EXPLORE_ITEM: u32 = 1;

// Section labels -----------------------------------------------------------
pub(crate) const LABEL_QUIZ: &str = "Quiz";
pub(crate) const LABEL_HAZARD: &str = "Spot the hazards";
pub(crate) const LABEL_CHECKLIST: &str = "Checklist";
pub(crate) const LABEL_EXPLORE: &str = "Learning";

// Feature tuning -----------------------------------------------------------
/// Idle time on the hazard scene before a hint is offered.
pub const HINT_IDLE_MS: u64 = 20_000;
/// Maximum number of recommendation lines shown under a checklist result.
pub const MAX_RECOMMENDATIONS: usize = 3;
/// Maximum number of habits listed after a finished quiz.
pub const MAX_HABITS_TO_IMPROVE: usize = 3;

// Certificate --------------------------------------------------------------
pub const CERT_WIDTH: u32 = 1600;
pub const CERT_HEIGHT: u32 = 900;
pub(crate) const CERT_FALLBACK_NAME: &str = "safety";
