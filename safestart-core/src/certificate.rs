//! Summary handed to the certificate renderer.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{CERT_FALLBACK_NAME, CERT_HEIGHT, CERT_WIDTH};
use crate::scoring::{ScoreResult, SectionScore};

/// Everything the canvas renderer draws, already laid out as plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub display_name: String,
    pub issued_on: NaiveDate,
    pub percent: u8,
    pub earned_points: u32,
    pub max_points: u32,
    pub rank_title: String,
    pub sections: Vec<SectionScore>,
    pub width: u32,
    pub height: u32,
}

impl Certificate {
    #[must_use]
    pub fn new(score: &ScoreResult, display_name: &str, issued_on: NaiveDate) -> Self {
        Self {
            display_name: display_name.trim().to_string(),
            issued_on,
            percent: score.percent,
            earned_points: score.earned_points,
            max_points: score.max_points,
            rank_title: score.rank_title.clone(),
            sections: score.sections.iter().into_iter().cloned().collect(),
            width: CERT_WIDTH,
            height: CERT_HEIGHT,
        }
    }

    /// Download name for the rendered PNG.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stem = if self.display_name.is_empty() {
            CERT_FALLBACK_NAME
        } else {
            self.display_name.as_str()
        };
        format!("certificate-{stem}.png")
    }

    /// Points line as printed on the certificate.
    #[must_use]
    pub fn points_line(&self) -> String {
        format!("{} / {} points", self.earned_points, self.max_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SectionBreakdown;

    fn score() -> ScoreResult {
        let section = |label: &str| SectionScore {
            earned: 5,
            max: 10,
            label: label.to_string(),
        };
        ScoreResult {
            earned_points: 20,
            max_points: 40,
            percent: 50,
            rank_title: "Confident Practitioner".into(),
            sections: SectionBreakdown {
                quiz: section("Quiz"),
                hazard: section("Spot the hazards"),
                checklist: section("Checklist"),
                explore: section("Learning"),
            },
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn trims_name_and_names_file() {
        let cert = Certificate::new(&score(), "  Dana Reyes ", day());
        assert_eq!(cert.display_name, "Dana Reyes");
        assert_eq!(cert.file_name(), "certificate-Dana Reyes.png");
        assert_eq!((cert.width, cert.height), (1600, 900));
        assert_eq!(cert.points_line(), "20 / 40 points");
    }

    #[test]
    fn blank_name_falls_back() {
        let cert = Certificate::new(&score(), "   ", day());
        assert_eq!(cert.file_name(), "certificate-safety.png");
    }

    #[test]
    fn sections_keep_display_order() {
        let cert = Certificate::new(&score(), "A", day());
        let labels: Vec<&str> = cert.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Quiz", "Spot the hazards", "Checklist", "Learning"]);
        let json = serde_json::to_value(&cert).unwrap();
        assert_eq!(json["issuedOn"], "2026-03-02");
        assert_eq!(json["rankTitle"], "Confident Practitioner");
    }
}
