//! SafeStart Progress Engine
//!
//! Platform-agnostic progress tracking and scoring for the SafeStart safety
//! training microsite. This crate holds the trackers, the scoring engine and
//! the hotspot editor without UI or platform-specific dependencies.

pub mod certificate;
pub mod checklist;
pub mod constants;
pub mod content;
pub mod editor;
pub mod error;
pub mod explore;
pub mod hazard;
pub mod hint;
pub mod numbers;
pub mod quiz;
pub mod scoring;
pub mod session;
pub mod storage;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

// Re-export commonly used types
pub use certificate::Certificate;
pub use checklist::{ChecklistOutcome, ChecklistReport, ChecklistState, ChecklistTracker};
pub use content::{
    Arkady, ChecklistItem, ChecklistThresholds, ContentDocument, ContentError, Control,
    HazardScene, Habit, Hero, Hotspot, QuizOption, QuizQuestion, Risk, SafeStartState, Season,
    WinterScenario,
};
pub use editor::{HotspotEditor, NormalizedPoint, SurfaceRect, normalize_pointer, probe};
pub use error::TrackerError;
pub use explore::{ExploreCategory, ExploreState, ExploreTracker};
pub use hazard::{HazardState, HazardTracker, RevealOutcome};
pub use hint::IdleHintTimer;
pub use quiz::{AnswerFeedback, QuizState, QuizStep, QuizTracker};
pub use scoring::{
    Rank, RankTable, ScoreResult, SectionBreakdown, SectionScore, calculate_score,
    calculate_score_with,
};
pub use session::{SessionConfig, SessionTracker};
pub use storage::{FileStore, FileStoreError, KeyValueStore, MemoryStore, ProgressStore, StorageKey};

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the content document from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or fails validation.
    fn load_content(&self) -> Result<ContentDocument, Self::Error>;

    /// Load an optional rank table overriding the stock titles
    ///
    /// # Errors
    ///
    /// Returns an error if a rank table exists but cannot be parsed.
    fn load_ranks(&self) -> Result<Option<RankTable>, Self::Error> {
        Ok(None)
    }
}

/// One visitor's microsite session: content, rank table, and every tracker
/// sharing a single backing store.
#[derive(Debug, Clone)]
pub struct Microsite<S> {
    content: ContentDocument,
    ranks: RankTable,
    store: ProgressStore<S>,
    session: SessionTracker<S>,
    checklist: ChecklistTracker<S>,
    quiz: QuizTracker<S>,
    hazard: HazardTracker<S>,
    explore: ExploreTracker<S>,
}

impl<S> Microsite<S>
where
    S: KeyValueStore + Clone,
{
    /// Load every slice from `backend` against `content`.
    pub fn open(content: ContentDocument, backend: S) -> Self {
        let store = ProgressStore::new(backend);
        Self {
            session: SessionTracker::load(store.clone()),
            checklist: ChecklistTracker::load(store.clone()),
            quiz: QuizTracker::load(store.clone(), &content),
            hazard: HazardTracker::load(store.clone(), &content),
            explore: ExploreTracker::load(store.clone()),
            ranks: RankTable::default(),
            content,
            store,
        }
    }

    /// Load content (and an optional rank table) through `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader cannot produce the content document or rank table.
    pub fn from_loader<L: ContentLoader>(loader: &L, backend: S) -> anyhow::Result<Self> {
        let content = loader
            .load_content()
            .context("failed to load content document")?;
        let ranks = loader.load_ranks().context("failed to load rank table")?;
        let site = Self::open(content, backend);
        Ok(match ranks {
            Some(ranks) => site.with_ranks(ranks),
            None => site,
        })
    }

    #[must_use]
    pub fn with_ranks(mut self, ranks: RankTable) -> Self {
        self.ranks = ranks;
        self
    }

    pub const fn content(&self) -> &ContentDocument {
        &self.content
    }

    pub const fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub const fn session(&self) -> &SessionConfig {
        self.session.config()
    }

    pub const fn checklist(&self) -> &ChecklistTracker<S> {
        &self.checklist
    }

    pub const fn quiz(&self) -> &QuizTracker<S> {
        &self.quiz
    }

    pub const fn hazard(&self) -> &HazardTracker<S> {
        &self.hazard
    }

    pub const fn explore(&self) -> &ExploreTracker<S> {
        &self.explore
    }

    // Session ---------------------------------------------------------------

    pub fn set_muted(&mut self, muted: bool) {
        self.session.set_muted(muted);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.session.toggle_mute()
    }

    /// Switch the seasonal tips and credit the season as explored.
    pub fn select_season(&mut self, season: Season) -> Option<&WinterScenario> {
        self.session.select_season(season);
        self.explore.mark_season(season);
        self.content.winter_scenario(season)
    }

    pub fn touch_last_visit(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.session.touch_last_visit(now)
    }

    pub const fn last_visit(&self) -> Option<DateTime<Utc>> {
        self.session.last_visit()
    }

    // Checklist -------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ChecklistTracker::toggle`].
    pub fn toggle_checklist(&mut self, id: &str) -> Result<bool, TrackerError> {
        self.checklist.toggle(&self.content, id)
    }

    pub fn show_checklist_result(&mut self) -> ChecklistReport {
        self.checklist.show_result(&self.content)
    }

    /// The result view of a checklist whose result was already shown.
    #[must_use]
    pub fn checklist_report(&self) -> Option<ChecklistReport> {
        self.checklist.report(&self.content)
    }

    pub fn reset_checklist(&mut self) {
        self.checklist.reset();
    }

    // Quiz ------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`QuizTracker::answer`].
    pub fn answer_quiz(&mut self, option_id: &str) -> Result<AnswerFeedback, TrackerError> {
        self.quiz.answer(&self.content, option_id)
    }

    /// # Errors
    ///
    /// See [`QuizTracker::advance`].
    pub fn advance_quiz(&mut self) -> Result<QuizStep, TrackerError> {
        self.quiz.advance(&self.content)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.quiz.current_question(&self.content)
    }

    #[must_use]
    pub fn habits_to_improve(&self) -> Vec<&str> {
        self.quiz.habits_to_improve(&self.content)
    }

    pub fn reset_quiz(&mut self) {
        self.quiz.reset();
    }

    // Hazard spotting -------------------------------------------------------

    pub fn start_hazard_watch(&mut self, now_ms: u64) {
        self.hazard.start_watch(now_ms);
    }

    pub fn reveal_hazard(&mut self, id: &str, now_ms: u64) -> RevealOutcome {
        self.hazard.reveal(&self.content, id, now_ms)
    }

    pub fn poll_hint(&mut self, now_ms: u64) -> bool {
        self.hazard.poll_hint(now_ms)
    }

    pub fn take_hint(&mut self) -> Option<&Hotspot> {
        self.hazard.take_hint(&self.content)
    }

    pub fn reset_hazard(&mut self, now_ms: u64) {
        self.hazard.reset(now_ms);
    }

    // Explore ---------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ExploreTracker::mark_opened`].
    pub fn mark_opened(&mut self, category: ExploreCategory, id: &str) -> Result<bool, TrackerError> {
        self.explore.mark_opened(&self.content, category, id)
    }

    // Results ---------------------------------------------------------------

    /// Score the slices as they are persisted right now.
    ///
    /// Every call re-reads the store, so progress written through another
    /// handle on the same backend is counted.
    #[must_use]
    pub fn calculate_score(&self) -> ScoreResult {
        calculate_score_with(
            &self.ranks,
            &self.content,
            &ChecklistState::stored(&self.store),
            &QuizState::stored(&self.store, &self.content),
            &HazardState::stored(&self.store, &self.content),
            &ExploreState::stored(&self.store),
        )
    }

    #[must_use]
    pub fn certificate(&self, display_name: &str, issued_on: NaiveDate) -> Certificate {
        Certificate::new(&self.calculate_score(), display_name, issued_on)
    }

    /// Re-read every slice from the backing store.
    pub fn reload(&mut self) {
        self.session = SessionTracker::load(self.store.clone());
        self.checklist = ChecklistTracker::load(self.store.clone());
        self.quiz = QuizTracker::load(self.store.clone(), &self.content);
        self.hazard = HazardTracker::load(self.store.clone(), &self.content);
        self.explore = ExploreTracker::load(self.store.clone());
    }

    /// Clear every persisted key and every in-memory slice.
    pub fn reset_all(&mut self) {
        self.store.reset_all();
        self.session.clear();
        self.checklist.clear();
        self.quiz.clear();
        self.hazard.clear();
        self.explore.clear();
    }
}
