//! Error types for curriculum, progress and topic resolution
//!
//! Every error here is an input-validation failure: local, recoverable and
//! never retried. Callers re-render their form and let the learner correct
//! the input.

use thiserror::Error;

/// The curriculum table is present but cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurriculumError {
    #[error("Curriculum table is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("Curriculum table row {row} has {found} cells, expected at least {expected}")]
    ShortRow { row: usize, found: usize, expected: usize },
}

/// Errors raised while recording or reading progress
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("Chapter '{chapter}' does not belong to subject '{subject}'")]
    InvalidChapter { subject: String, chapter: String },

    #[error("Subject '{subject}' has no chapters, completion is undefined")]
    DivisionUndefined { subject: String },
}

/// Errors raised when the next topic cannot be decided without more input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No subject selected: choose at least one subject to continue from")]
    NoScopeSelected,

    #[error("Every selected subject is complete: {}", .completed.join(", "))]
    NothingLeft { completed: Vec<String> },

    #[error("No chapters available for: {}", .subjects.join(", "))]
    NoChapters { subjects: Vec<String> },
}

impl ResolveError {
    /// Whether the learner can fix this by changing the form input
    pub fn is_user_actionable(&self) -> bool {
        match self {
            ResolveError::NoScopeSelected => true,
            ResolveError::NothingLeft { .. } => true,
            ResolveError::NoChapters { .. } => false,
        }
    }
}
