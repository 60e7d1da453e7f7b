//! Error taxonomy for the practice backend.
//!
//! Generation and grading are pure, so every error here is a local validation
//! failure reported straight back to the caller. The classifier itself never
//! fails and has no variant here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// A specialized `Result` type for practice operations.
pub type Result<T> = std::result::Result<T, TutorError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TutorError {
    /// Topic name outside the fixed set.
    #[error("Unknown topic '{0}' (expected addition, subtraction, multiplication, division or rounding)")]
    UnknownTopic(String),

    /// Difficulty outside 1..=3.
    #[error("Invalid difficulty {0} (expected 1, 2 or 3)")]
    InvalidDifficulty(i64),

    /// Problem data that cannot describe a valid exercise.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// The submitted text is not an integer; treated as "nothing submitted".
    #[error("No answer submitted: '{0}' is not a whole number")]
    NoAnswer(String),

    /// Problem id was never issued, or has already been retired.
    #[error("Unknown problemId: {0}")]
    UnknownProblem(String),
}

impl TutorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TutorError::UnknownTopic(_) | TutorError::InvalidDifficulty(_) | TutorError::NoAnswer(_) => {
                StatusCode::BAD_REQUEST
            }
            TutorError::InvalidProblem(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TutorError::UnknownProblem(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for TutorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
