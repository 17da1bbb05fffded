//! Static content document: the read-only payload the microsite is built from.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::explore::ExploreCategory;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate id `{id}` in {collection}")]
    DuplicateId { collection: &'static str, id: String },
    #[error("question `{question}` names answer `{answer}` which is not one of its options")]
    UnknownAnswer { question: String, answer: String },
    #[error("checklist thresholds must ascend (yellow {yellow} > red {red})")]
    Thresholds { yellow: u32, red: u32 },
}

/// Winter season used by the seasonal-tips module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Snow,
    Thaw,
    Frost,
}

impl Season {
    pub const ALL: [Self; 3] = [Self::Snow, Self::Thaw, Self::Frost];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snow => "snow",
            Self::Thaw => "thaw",
            Self::Frost => "frost",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "snow" => Ok(Self::Snow),
            "thaw" => Ok(Self::Thaw),
            "frost" => Ok(Self::Frost),
            other => Err(format!("unknown season `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub cta_primary: String,
    #[serde(default)]
    pub cta_secondary: String,
}

/// A habit card in Arkady's tips panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arkady {
    #[serde(default)]
    pub intro: String,
    #[serde(default, rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

/// One panel of the risk accordion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// One level of the hierarchy of controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub risk_category: String,
}

/// Unchecked-item counts at which the checklist turns yellow and red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistThresholds {
    pub yellow: u32,
    pub red: u32,
}

impl Default for ChecklistThresholds {
    fn default() -> Self {
        Self { yellow: 3, red: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<QuizOption>,
    /// Id of the correct option.
    pub answer: String,
    #[serde(default)]
    pub explain: String,
    #[serde(default)]
    pub habit: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == option_id)
    }
}

/// A clickable hazard on the spotting scene, positioned in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub fix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardScene {
    #[serde(default)]
    pub scene_id: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeStartState {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub anti_dote: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinterScenario {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

fn default_version() -> u32 {
    1
}

/// Complete content payload supplied at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub arkady: Arkady,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub checklist_thresholds: ChecklistThresholds,
    #[serde(default)]
    pub checklist_recommendations: BTreeMap<String, String>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    #[serde(default)]
    pub hazard_spotting: HazardScene,
    #[serde(default)]
    pub safe_start_states: Vec<SafeStartState>,
    #[serde(default)]
    pub winter_scenarios: BTreeMap<Season, WinterScenario>,
}

impl Default for ContentDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            hero: Hero::default(),
            arkady: Arkady::default(),
            risks: Vec::new(),
            controls: Vec::new(),
            checklist: Vec::new(),
            checklist_thresholds: ChecklistThresholds::default(),
            checklist_recommendations: BTreeMap::new(),
            quiz: Vec::new(),
            hazard_spotting: HazardScene::default(),
            safe_start_states: Vec::new(),
            winter_scenarios: BTreeMap::new(),
        }
    }
}

impl ContentDocument {
    /// Parse and validate a content document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the document breaks a structural rule
    /// (duplicate ids, a quiz answer outside its options, descending thresholds).
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check the structural rules the trackers rely on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ContentError> {
        ensure_unique("habits", self.arkady.habits.iter().map(|h| h.id.as_str()))?;
        ensure_unique("risks", self.risks.iter().map(|r| r.id.as_str()))?;
        ensure_unique("controls", self.controls.iter().map(|c| c.id.as_str()))?;
        ensure_unique("checklist", self.checklist.iter().map(|c| c.id.as_str()))?;
        ensure_unique("quiz", self.quiz.iter().map(|q| q.id.as_str()))?;
        ensure_unique(
            "hotspots",
            self.hazard_spotting.hotspots.iter().map(|h| h.id.as_str()),
        )?;
        ensure_unique(
            "safe_start_states",
            self.safe_start_states.iter().map(|s| s.id.as_str()),
        )?;

        if let Some(q) = self.quiz.iter().find(|q| !q.has_option(&q.answer)) {
            return Err(ContentError::UnknownAnswer {
                question: q.id.clone(),
                answer: q.answer.clone(),
            });
        }

        let ChecklistThresholds { yellow, red } = self.checklist_thresholds;
        if yellow > red {
            return Err(ContentError::Thresholds { yellow, red });
        }
        Ok(())
    }

    #[must_use]
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hazard_spotting.hotspots
    }

    #[must_use]
    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hazard_spotting.hotspots.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn question(&self, id: &str) -> Option<&QuizQuestion> {
        self.quiz.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn has_checklist_item(&self, id: &str) -> bool {
        self.checklist.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn recommendation(&self, category: &str) -> Option<&str> {
        self.checklist_recommendations
            .get(category)
            .map(String::as_str)
    }

    #[must_use]
    pub fn winter_scenario(&self, season: Season) -> Option<&WinterScenario> {
        self.winter_scenarios.get(&season)
    }

    /// Identifiers that can be opened in an explore category, in document order.
    #[must_use]
    pub fn explorable_ids(&self, category: ExploreCategory) -> Vec<&str> {
        match category {
            ExploreCategory::Habits => self.arkady.habits.iter().map(|h| h.id.as_str()).collect(),
            ExploreCategory::Risks => self.risks.iter().map(|r| r.id.as_str()).collect(),
            ExploreCategory::Controls => self.controls.iter().map(|c| c.id.as_str()).collect(),
            ExploreCategory::SafeStartStates => self
                .safe_start_states
                .iter()
                .map(|s| s.id.as_str())
                .collect(),
            ExploreCategory::Seasons => Season::ALL.iter().map(|s| s.as_str()).collect(),
        }
    }

    /// Whether `id` names an item of `category` in this document.
    #[must_use]
    pub fn is_explorable(&self, category: ExploreCategory, id: &str) -> bool {
        self.explorable_ids(category).contains(&id)
    }

    /// Number of explorable items in a category; seasons always have three slots.
    #[must_use]
    pub fn explorable_count(&self, category: ExploreCategory) -> usize {
        match category {
            ExploreCategory::Habits => self.arkady.habits.len(),
            ExploreCategory::Risks => self.risks.len(),
            ExploreCategory::Controls => self.controls.len(),
            ExploreCategory::SafeStartStates => self.safe_start_states.len(),
            ExploreCategory::Seasons => Season::ALL.len(),
        }
    }
}

fn ensure_unique<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ContentError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "checklist": [
            { "id": "c1", "text": "Shoes", "risk_category": "footwear" }
        ],
        "quiz": [
            {
                "id": "q1",
                "question": "Stairs?",
                "options": [ { "id": "a", "text": "Rail" }, { "id": "b", "text": "Run" } ],
                "answer": "a",
                "habit": "Use the rail"
            }
        ],
        "hazard_spotting": {
            "hotspots": [ { "id": "h1", "label": "Spill", "x": 0.5, "y": 0.5 } ]
        },
        "winter_scenarios": {
            "frost": { "title": "Black ice", "tips": ["Slow down"] }
        }
    }"#;

    #[test]
    fn parses_minimal_document_with_defaults() {
        let doc = ContentDocument::from_json(MINIMAL).unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.checklist.len(), 1);
        assert_eq!(doc.checklist_thresholds, ChecklistThresholds::default());
        assert_eq!(doc.quiz[0].habit, "Use the rail");
        assert!(doc.hotspot("h1").is_some());
        assert_eq!(
            doc.winter_scenario(Season::Frost).map(|s| s.title.as_str()),
            Some("Black ice")
        );
        assert!(doc.winter_scenario(Season::Snow).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{ "risks": [
            { "id": "slips", "title": "Slips" },
            { "id": "slips", "title": "Again" }
        ] }"#;
        let err = ContentDocument::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ContentError::DuplicateId { collection: "risks", .. }
        ));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let json = r#"{ "quiz": [ {
            "id": "q1", "question": "?", "answer": "z",
            "options": [ { "id": "a", "text": "A" } ]
        } ] }"#;
        let err = ContentDocument::from_json(json).unwrap_err();
        assert!(matches!(err, ContentError::UnknownAnswer { .. }));
    }

    #[test]
    fn rejects_descending_thresholds() {
        let json = r#"{ "checklist_thresholds": { "yellow": 5, "red": 2 } }"#;
        let err = ContentDocument::from_json(json).unwrap_err();
        assert!(matches!(err, ContentError::Thresholds { yellow: 5, red: 2 }));
    }

    #[test]
    fn seasons_always_count_three_slots() {
        let doc = ContentDocument::default();
        assert_eq!(doc.explorable_count(ExploreCategory::Seasons), 3);
        assert!(doc.is_explorable(ExploreCategory::Seasons, "thaw"));
        assert!(!doc.is_explorable(ExploreCategory::Seasons, "monsoon"));
        assert_eq!(doc.explorable_count(ExploreCategory::Habits), 0);
    }

    #[test]
    fn season_parses_and_displays() {
        assert_eq!("frost".parse::<Season>(), Ok(Season::Frost));
        assert!("summer".parse::<Season>().is_err());
        assert_eq!(Season::Thaw.to_string(), "thaw");
    }
}
