//! Grading error types.
//!
//! The scoring engine is total over well-formed attempts. These errors cover
//! the data problems that would otherwise corrupt statistics silently, so they
//! are raised while an attempt record is turned into the typed model.

use thiserror::Error;

use crate::model::QuestionKind;

/// Errors raised when an attempt record cannot be graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingError {
    /// The question carries a kind tag that is not one of the four known kinds.
    #[error("question {question_id}: unknown question kind '{kind}'")]
    UnknownQuestionKind { question_id: String, kind: String },

    /// The group's question type marker is not one of the four known kinds.
    #[error("group {group_id}: unknown question kind '{kind}'")]
    UnknownGroupKind { group_id: String, kind: String },

    /// A question's kind disagrees with the kind declared by its group.
    #[error("question {question_id} in group {group_id} is {found}, but the group holds {expected} questions")]
    GroupKindMismatch {
        group_id: String,
        question_id: String,
        expected: QuestionKind,
        found: QuestionKind,
    },

    /// The answer key field required by the question's kind is missing or blank.
    #[error("question {question_id}: missing answer key field '{field}'")]
    MissingAnswerKey {
        question_id: String,
        field: &'static str,
    },
}

impl GradingError {
    /// The id of the question the error refers to, if it is question-level.
    pub fn question_id(&self) -> Option<&str> {
        match self {
            GradingError::UnknownQuestionKind { question_id, .. }
            | GradingError::GroupKindMismatch { question_id, .. }
            | GradingError::MissingAnswerKey { question_id, .. } => {
                Some(question_id.as_str())
            }
            GradingError::UnknownGroupKind { .. } => None,
        }
    }
}
