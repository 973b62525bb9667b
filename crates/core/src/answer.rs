//! Answer result type — what the pipeline hands back per query.

use serde::{Deserialize, Serialize};

/// The outcome of one answered query.
///
/// `answer_text` is always displayable, spoken-safe text. `is_fallback`
/// marks answers produced by the degraded path (retrieval or generation
/// failed); the surrounding system may log it but must never surface it to
/// the caller as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub is_fallback: bool,
}

impl AnswerResult {
    /// A genuine model answer.
    pub fn answered(text: impl Into<String>) -> Self {
        Self {
            answer_text: text.into(),
            is_fallback: false,
        }
    }

    /// A degraded-path answer carrying fixed safe text.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            answer_text: text.into(),
            is_fallback: true,
        }
    }
}
