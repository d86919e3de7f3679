//! Field Normalization
//!
//! Maps one loosely-shaped question record onto `GeneratedQuestion`.
//! Backends disagree on key names and value shapes, so every field goes
//! through candidate-key coalescing and string coercion first, then the
//! enum fields through lenient parsing with deterministic defaults.

use serde_json::Value;
use tracing::debug;

use super::markdown::strip_markdown;
use crate::types::{
    BloomLevel, Difficulty, GeneratedQuestion, Marks, QuestionType, coalesce_field,
};

const QUESTION_KEYS: &[&str] = &["question_text", "question", "questionText", "text", "q"];
const ANSWER_KEYS: &[&str] = &["answer_text", "answer", "answerText", "solution", "a"];
const DIFFICULTY_KEYS: &[&str] = &["difficulty_level", "difficulty", "difficultyLevel", "level"];
const BLOOM_KEYS: &[&str] = &[
    "bloom_level",
    "bloom",
    "bloomLevel",
    "blooms_level",
    "bloom_taxonomy",
];
const JUSTIFICATION_KEYS: &[&str] = &[
    "bloom_justification",
    "justification",
    "bloomJustification",
    "reasoning",
];
const TYPE_KEYS: &[&str] = &["question_type", "type", "questionType"];
const MARKS_KEYS: &[&str] = &["marks", "mark", "points", "score"];

/// Provenance labels stamped onto every normalized question.
#[derive(Debug, Clone)]
pub struct SourceLabels {
    pub course_name: String,
    pub material_name: String,
    pub unit_number: u32,
}

/// Normalize one record into a `GeneratedQuestion`.
///
/// Missing or unparseable fields fall back to defaults: MEDIUM difficulty,
/// UNDERSTAND Bloom level, DIRECT type, and marks derived from difficulty.
/// Missing text fields come back empty and are left to the quality filter.
pub fn normalize_record(record: &Value, labels: &SourceLabels) -> GeneratedQuestion {
    let question_text = coalesce_field(record, QUESTION_KEYS)
        .map(|t| strip_markdown(&t))
        .unwrap_or_default();
    let answer_text = coalesce_field(record, ANSWER_KEYS)
        .map(|t| strip_markdown(&t))
        .unwrap_or_default();

    let difficulty_level = parse_enum(record, DIFFICULTY_KEYS, Difficulty::from_loose)
        .unwrap_or(Difficulty::Medium);
    let bloom_level =
        parse_enum(record, BLOOM_KEYS, BloomLevel::from_loose).unwrap_or(BloomLevel::Understand);
    let question_type =
        parse_enum(record, TYPE_KEYS, QuestionType::from_loose).unwrap_or(QuestionType::Direct);
    let marks = parse_enum(record, MARKS_KEYS, Marks::from_loose)
        .unwrap_or_else(|| Marks::for_difficulty(difficulty_level));

    let bloom_justification = coalesce_field(record, JUSTIFICATION_KEYS)
        .map(|t| strip_markdown(&t))
        .filter(|t| !t.is_empty());

    GeneratedQuestion {
        question_text,
        answer_text,
        difficulty_level,
        bloom_level,
        bloom_justification,
        question_type,
        marks,
        unit_number: labels.unit_number,
        course_name: labels.course_name.clone(),
        material_name: labels.material_name.clone(),
    }
}

fn parse_enum<T>(record: &Value, keys: &[&str], parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = coalesce_field(record, keys)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        debug!("unrecognized value '{raw}' for {}, using default", keys[0]);
    }
    parsed
}
