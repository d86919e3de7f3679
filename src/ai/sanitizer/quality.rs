//! Quality Inspection
//!
//! Two layers run over every normalized question:
//!
//! - **Warnings**: diagnostics about suspicious content. Never errors and
//!   never block a question on their own; callers surface them to the user.
//! - **Strict filter**: the hard floor. Questions below it are dropped
//!   before they reach the caller.

use std::fmt;

use crate::constants::sanitizer;
use crate::types::{BloomLevel, Difficulty, GeneratedQuestion};

/// A diagnostic about one normalized question. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityWarning {
    /// Question text empty after normalization
    EmptyQuestion { index: usize },
    /// Answer text empty after normalization
    EmptyAnswer { index: usize },
    /// Question or answer contains a known placeholder phrase
    PlaceholderText { index: usize },
    /// Bloom level outside the expected band for the difficulty
    BloomMismatch {
        index: usize,
        difficulty: Difficulty,
        bloom: BloomLevel,
    },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuestion { index } => {
                write!(f, "question #{}: empty question text", index + 1)
            }
            Self::EmptyAnswer { index } => {
                write!(f, "question #{}: empty answer text", index + 1)
            }
            Self::PlaceholderText { index } => {
                write!(f, "question #{}: contains placeholder text", index + 1)
            }
            Self::BloomMismatch {
                index,
                difficulty,
                bloom,
            } => write!(
                f,
                "question #{}: Bloom level {bloom} unusual for {difficulty} difficulty",
                index + 1
            ),
        }
    }
}

/// Collect diagnostics for one question. `index` is its position in the
/// response batch, used only for reporting.
pub fn inspect(question: &GeneratedQuestion, index: usize) -> Vec<QualityWarning> {
    let mut warnings = Vec::new();

    if question.question_text.is_empty() {
        warnings.push(QualityWarning::EmptyQuestion { index });
    }
    if question.answer_text.is_empty() {
        warnings.push(QualityWarning::EmptyAnswer { index });
    }
    if contains_placeholder(&question.question_text) || contains_placeholder(&question.answer_text)
    {
        warnings.push(QualityWarning::PlaceholderText { index });
    }
    if !question.bloom_level.matches_difficulty(question.difficulty_level) {
        warnings.push(QualityWarning::BloomMismatch {
            index,
            difficulty: question.difficulty_level,
            bloom: question.bloom_level,
        });
    }

    warnings
}

/// The hard floor. A question passes when:
///
/// - question text is at least `MIN_QUESTION_CHARS` characters
/// - answer text is at least `MIN_ANSWER_CHARS` characters
/// - answer word count meets the floor for its mark level
/// - neither field contains a placeholder phrase
pub fn passes_strict_filter(question: &GeneratedQuestion) -> bool {
    if question.question_text.chars().count() < sanitizer::MIN_QUESTION_CHARS {
        return false;
    }
    if question.answer_text.chars().count() < sanitizer::MIN_ANSWER_CHARS {
        return false;
    }
    if question.answer_text.split_whitespace().count() < question.marks.min_answer_words() {
        return false;
    }
    if contains_placeholder(&question.question_text) || contains_placeholder(&question.answer_text)
    {
        return false;
    }
    true
}

fn contains_placeholder(text: &str) -> bool {
    let lowered = text.to_lowercase();
    sanitizer::PLACEHOLDER_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}
