//! Tracker error types.
//!
//! These describe calls a UI should not make (answering twice, toggling a
//! locked checklist). Storage failures never surface here; they degrade to
//! default slices inside [`crate::storage::ProgressStore`].

use thiserror::Error;

/// Rejected tracker operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The checklist result is showing; reset the checklist to edit it again.
    #[error("checklist result already shown")]
    ChecklistLocked,

    /// The id is not a checklist item in the content document.
    #[error("unknown checklist item: {0}")]
    UnknownChecklistItem(String),

    /// The quiz has been finished; reset it to play again.
    #[error("quiz already completed")]
    QuizCompleted,

    /// The current question already has a recorded answer.
    #[error("question {0} already answered")]
    AlreadyAnswered(String),

    /// The option does not belong to the current question.
    #[error("option {option} is not offered by question {question}")]
    UnknownOption { question: String, option: String },

    /// The quiz cannot advance until the current question is answered.
    #[error("question {0} has not been answered")]
    NotAnswered(String),

    /// The content document has no quiz questions.
    #[error("quiz has no questions")]
    EmptyQuiz,

    /// The id is not an item of the explore category.
    #[error("unknown {category} item: {id}")]
    UnknownExploreItem { category: &'static str, id: String },
}
