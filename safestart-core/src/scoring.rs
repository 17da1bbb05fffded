//! Aggregate score across quiz, hazard, checklist and explore progress.
//!
//! Scores are always recomputed from the current slices; nothing here is cached.
use serde::{Deserialize, Serialize};

use crate::checklist::ChecklistState;
use crate::constants::{
    LABEL_CHECKLIST, LABEL_EXPLORE, LABEL_HAZARD, LABEL_QUIZ, POINTS_CHECKLIST_COMPLETED_BONUS,
    POINTS_CHECKLIST_ITEM, POINTS_EXPLORE_ITEM, POINTS_HAZARD_ALL_BONUS, POINTS_HAZARD_FOUND,
    POINTS_QUIZ_CORRECT,
};
use crate::content::ContentDocument;
use crate::explore::{ExploreCategory, ExploreState};
use crate::hazard::HazardState;
use crate::numbers::{len_to_u32, percent_of};
use crate::quiz::{QuizState, correct_count};

/// A rank title unlocked at `min_percent` and above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    pub min_percent: u8,
    pub title: String,
}

/// Rank thresholds, kept in descending order of `min_percent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rank>", into = "Vec<Rank>")]
pub struct RankTable {
    ranks: Vec<Rank>,
}

impl From<Vec<Rank>> for RankTable {
    fn from(ranks: Vec<Rank>) -> Self {
        Self::new(ranks)
    }
}

impl From<RankTable> for Vec<Rank> {
    fn from(table: RankTable) -> Self {
        table.ranks
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::new(vec![
            Rank {
                min_percent: 100,
                title: "Risk Control Expert".to_string(),
            },
            Rank {
                min_percent: 80,
                title: "Pro".to_string(),
            },
            Rank {
                min_percent: 50,
                title: "Confident Practitioner".to_string(),
            },
            Rank {
                min_percent: 0,
                title: "Beginner".to_string(),
            },
        ])
    }
}

impl RankTable {
    #[must_use]
    pub fn new(mut ranks: Vec<Rank>) -> Self {
        ranks.sort_by(|a, b| b.min_percent.cmp(&a.min_percent));
        Self { ranks }
    }

    /// Load a rank table from a JSON array of `{minPercent, title}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Title of the first rank whose threshold `percent` reaches.
    ///
    /// Falls back to the lowest rank when no threshold matches, and to an
    /// empty title for an empty table.
    #[must_use]
    pub fn title_for(&self, percent: u8) -> &str {
        self.ranks
            .iter()
            .find(|rank| rank.min_percent <= percent)
            .or_else(|| self.ranks.last())
            .map_or("", |rank| rank.title.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub earned: u32,
    pub max: u32,
    pub label: String,
}

impl SectionScore {
    fn new(earned: u32, max: u32, label: &str) -> Self {
        Self {
            earned,
            max,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBreakdown {
    pub quiz: SectionScore,
    pub hazard: SectionScore,
    pub checklist: SectionScore,
    pub explore: SectionScore,
}

impl SectionBreakdown {
    /// Sections in display order.
    #[must_use]
    pub fn iter(&self) -> [&SectionScore; 4] {
        [&self.quiz, &self.hazard, &self.checklist, &self.explore]
    }
}

/// Normalized overall score consumed by the results view and certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub earned_points: u32,
    pub max_points: u32,
    /// Integer 0..=100.
    pub percent: u8,
    pub rank_title: String,
    pub sections: SectionBreakdown,
}

#[must_use]
pub fn quiz_section(content: &ContentDocument, quiz: &QuizState) -> SectionScore {
    let earned = correct_count(content, &quiz.answers) * POINTS_QUIZ_CORRECT;
    let max = len_to_u32(content.quiz.len()) * POINTS_QUIZ_CORRECT;
    SectionScore::new(earned, max, LABEL_QUIZ)
}

#[must_use]
pub fn hazard_section(content: &ContentDocument, hazard: &HazardState) -> SectionScore {
    let total = len_to_u32(content.hotspots().len());
    let found = hazard.found_count(content);
    let bonus = if total > 0 && found == total {
        POINTS_HAZARD_ALL_BONUS
    } else {
        0
    };
    let earned = found * POINTS_HAZARD_FOUND + bonus;
    let max = total * POINTS_HAZARD_FOUND + POINTS_HAZARD_ALL_BONUS;
    SectionScore::new(earned, max, LABEL_HAZARD)
}

#[must_use]
pub fn checklist_section(content: &ContentDocument, checklist: &ChecklistState) -> SectionScore {
    let bonus = if checklist.completed {
        POINTS_CHECKLIST_COMPLETED_BONUS
    } else {
        0
    };
    let earned = checklist.checked_count(content) * POINTS_CHECKLIST_ITEM + bonus;
    let max = len_to_u32(content.checklist.len()) * POINTS_CHECKLIST_ITEM
        + POINTS_CHECKLIST_COMPLETED_BONUS;
    SectionScore::new(earned, max, LABEL_CHECKLIST)
}

#[must_use]
pub fn explore_section(content: &ContentDocument, explore: &ExploreState) -> SectionScore {
    let available: u32 = ExploreCategory::ALL
        .iter()
        .map(|category| len_to_u32(content.explorable_count(*category)))
        .sum();
    let earned = explore.total_opened(content) * POINTS_EXPLORE_ITEM;
    SectionScore::new(earned, available * POINTS_EXPLORE_ITEM, LABEL_EXPLORE)
}

/// Score every section with the stock rank table.
#[must_use]
pub fn calculate_score(
    content: &ContentDocument,
    checklist: &ChecklistState,
    quiz: &QuizState,
    hazard: &HazardState,
    explore: &ExploreState,
) -> ScoreResult {
    calculate_score_with(
        &RankTable::default(),
        content,
        checklist,
        quiz,
        hazard,
        explore,
    )
}

/// Score every section and pick the rank from `ranks`.
#[must_use]
pub fn calculate_score_with(
    ranks: &RankTable,
    content: &ContentDocument,
    checklist: &ChecklistState,
    quiz: &QuizState,
    hazard: &HazardState,
    explore: &ExploreState,
) -> ScoreResult {
    let sections = SectionBreakdown {
        quiz: quiz_section(content, quiz),
        hazard: hazard_section(content, hazard),
        checklist: checklist_section(content, checklist),
        explore: explore_section(content, explore),
    };
    let earned_points: u32 = sections.iter().iter().map(|s| s.earned).sum();
    let max_points: u32 = sections.iter().iter().map(|s| s.max).sum();
    let percent = percent_of(earned_points, max_points);
    ScoreResult {
        earned_points,
        max_points,
        percent,
        rank_title: ranks.title_for(percent).to_string(),
        sections,
    }
}
