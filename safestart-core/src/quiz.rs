//! Multiple-choice quiz: one answer per question, scored on finish.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::MAX_HABITS_TO_IMPROVE;
use crate::content::{ContentDocument, QuizQuestion};
use crate::error::TrackerError;
use crate::numbers::{len_to_u32, percent_of};
use crate::storage::{KeyValueStore, ProgressStore, StorageKey};

/// Persisted quiz slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    /// Question id to chosen option id.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub current_question: usize,
    #[serde(default)]
    pub completed: bool,
    /// Integer percent, stored once the quiz is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl QuizState {
    /// The slice as currently persisted, normalized against `content`.
    #[must_use]
    pub fn stored<S: KeyValueStore>(store: &ProgressStore<S>, content: &ContentDocument) -> Self {
        store
            .read_slice::<Self>(StorageKey::Quiz)
            .map(|state| state.normalized(content))
            .unwrap_or_default()
    }

    /// Drop answers to unknown questions and pull the cursor back into range.
    #[must_use]
    pub fn normalized(mut self, content: &ContentDocument) -> Self {
        self.answers.retain(|question, _| content.question(question).is_some());
        let last = content.quiz.len().saturating_sub(1);
        self.current_question = self.current_question.min(last);
        if !self.completed {
            self.score = None;
        } else if self.score.is_none() {
            self.score = Some(score_percent(content, &self.answers));
        }
        self
    }
}

/// Number of questions whose recorded answer matches the key.
#[must_use]
pub fn correct_count(content: &ContentDocument, answers: &BTreeMap<String, String>) -> u32 {
    len_to_u32(
        content
            .quiz
            .iter()
            .filter(|q| answers.get(&q.id).is_some_and(|chosen| *chosen == q.answer))
            .count(),
    )
}

/// `round(correct / total * 100)`; 0 for an empty quiz.
#[must_use]
pub fn score_percent(content: &ContentDocument, answers: &BTreeMap<String, String>) -> u8 {
    percent_of(correct_count(content, answers), len_to_u32(content.quiz.len()))
}

/// Habits tied to wrong or missing answers, in document order, first three only.
///
/// Repeated habit texts are kept; the cap is positional.
#[must_use]
pub fn habits_to_improve<'a>(
    content: &'a ContentDocument,
    answers: &BTreeMap<String, String>,
) -> Vec<&'a str> {
    content
        .quiz
        .iter()
        .filter(|q| answers.get(&q.id) != Some(&q.answer))
        .map(|q| q.habit.as_str())
        .take(MAX_HABITS_TO_IMPROVE)
        .collect()
}

/// Immediate feedback after confirming an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub question_id: String,
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
}

/// Result of moving past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizStep {
    /// Now showing the question at this index.
    Next { index: usize },
    /// The last question was answered; percent score.
    Finished { score: u8 },
}

/// Owns the quiz slice and re-persists it after every mutation.
#[derive(Debug, Clone)]
pub struct QuizTracker<S> {
    store: ProgressStore<S>,
    state: QuizState,
}

impl<S: KeyValueStore> QuizTracker<S> {
    /// Load the stored slice against the current question bank.
    pub fn load(store: ProgressStore<S>, content: &ContentDocument) -> Self {
        let state = QuizState::stored(&store, content);
        Self { store, state }
    }

    pub const fn state(&self) -> &QuizState {
        &self.state
    }

    /// The question currently on screen, if the quiz is still running.
    #[must_use]
    pub fn current_question<'a>(&self, content: &'a ContentDocument) -> Option<&'a QuizQuestion> {
        if self.state.completed {
            return None;
        }
        content.quiz.get(self.state.current_question)
    }

    /// Record `option_id` as the answer to the current question.
    ///
    /// # Errors
    ///
    /// Fails when the quiz is finished or empty, the question already has an
    /// answer, or the option is not offered by the question.
    pub fn answer(
        &mut self,
        content: &ContentDocument,
        option_id: &str,
    ) -> Result<AnswerFeedback, TrackerError> {
        if self.state.completed {
            return Err(TrackerError::QuizCompleted);
        }
        let question = content
            .quiz
            .get(self.state.current_question)
            .ok_or(TrackerError::EmptyQuiz)?;
        if self.state.answers.contains_key(&question.id) {
            return Err(TrackerError::AlreadyAnswered(question.id.clone()));
        }
        if !question.has_option(option_id) {
            return Err(TrackerError::UnknownOption {
                question: question.id.clone(),
                option: option_id.to_string(),
            });
        }

        self.state
            .answers
            .insert(question.id.clone(), option_id.to_string());
        let correct = question.answer == option_id;
        log::debug!("quiz {} answered {option_id} correct={correct}", question.id);
        self.persist();

        Ok(AnswerFeedback {
            question_id: question.id.clone(),
            correct,
            correct_option: question.answer.clone(),
            explanation: question.explain.clone(),
        })
    }

    /// Go to the next question, or finish the quiz after the last one.
    ///
    /// # Errors
    ///
    /// Fails when the quiz is finished or empty, or the current question is unanswered.
    pub fn advance(&mut self, content: &ContentDocument) -> Result<QuizStep, TrackerError> {
        if self.state.completed {
            return Err(TrackerError::QuizCompleted);
        }
        let question = content
            .quiz
            .get(self.state.current_question)
            .ok_or(TrackerError::EmptyQuiz)?;
        if !self.state.answers.contains_key(&question.id) {
            return Err(TrackerError::NotAnswered(question.id.clone()));
        }

        let step = if self.state.current_question + 1 < content.quiz.len() {
            self.state.current_question += 1;
            QuizStep::Next {
                index: self.state.current_question,
            }
        } else {
            let score = score_percent(content, &self.state.answers);
            self.state.completed = true;
            self.state.score = Some(score);
            log::info!("quiz finished with {score}%");
            QuizStep::Finished { score }
        };
        self.persist();
        Ok(step)
    }

    /// Habits to work on, available once the quiz is finished.
    #[must_use]
    pub fn habits_to_improve<'a>(&self, content: &'a ContentDocument) -> Vec<&'a str> {
        if !self.state.completed {
            return Vec::new();
        }
        habits_to_improve(content, &self.state.answers)
    }

    /// Start over from the first question.
    pub fn reset(&mut self) {
        self.clear();
        self.persist();
    }

    pub(crate) fn clear(&mut self) {
        self.state = QuizState::default();
    }

    fn persist(&self) {
        self.store.write_slice(StorageKey::Quiz, &self.state);
    }
}
