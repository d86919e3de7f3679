//! Response Sanitization
//!
//! Turns a raw completion response into validated `GeneratedQuestion`
//! records. The pipeline is deliberately forgiving on shape and strict on
//! substance:
//!
//! 1. **extract**: find and parse the first JSON object in the raw text
//! 2. **fields**: coalesce alternate key names, coerce value shapes,
//!    normalize enums with defaults, strip markdown from text
//! 3. **quality**: collect diagnostics, then drop questions below the
//!    hard floor
//!
//! Only extraction can fail (`ForgeError::Parse`, retryable). Everything
//! after it degrades to warnings and dropped records.

mod extract;
mod fields;
mod markdown;
mod quality;

pub use quality::QualityWarning;

use tracing::{debug, warn};

use self::fields::SourceLabels;
use crate::types::{GeneratedQuestion, GenerationRequest, Result};

/// The outcome of sanitizing one response.
#[derive(Debug, Clone)]
pub struct SanitizedBatch {
    /// Questions that survived normalization and the strict filter
    pub questions: Vec<GeneratedQuestion>,
    /// Diagnostics collected along the way; informational only
    pub warnings: Vec<QualityWarning>,
    /// Records dropped by the strict filter or unusable outright
    pub dropped: usize,
}

/// Sanitizes raw completion responses for one material.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    labels: SourceLabels,
}

impl Sanitizer {
    pub fn new(
        course_name: impl Into<String>,
        material_name: impl Into<String>,
        unit_number: u32,
    ) -> Self {
        Self {
            labels: SourceLabels {
                course_name: course_name.into(),
                material_name: material_name.into(),
                unit_number,
            },
        }
    }

    /// Build a sanitizer stamped with the request's provenance labels.
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self::new(
            request.course_name.clone(),
            request.material_name.clone(),
            request.unit_number,
        )
    }

    /// Sanitize one raw response.
    ///
    /// Returns `ForgeError::Parse` only when no JSON object can be
    /// extracted. A parseable object with no "questions" key yields an
    /// empty batch; the retry loop upstream decides what to do with it.
    pub fn sanitize(&self, raw: &str) -> Result<SanitizedBatch> {
        let root = extract::extract_json_object(raw)?;

        let records = match root.get("questions") {
            Some(value) => value.as_array().cloned().unwrap_or_default(),
            None => {
                debug!("response JSON has no 'questions' key, treating as empty");
                Vec::new()
            }
        };

        let mut questions = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();
        let mut dropped = 0usize;

        for (index, record) in records.iter().enumerate() {
            if !record.is_object() {
                warn!("question #{} is not a JSON object, dropping", index + 1);
                dropped += 1;
                continue;
            }

            let question = fields::normalize_record(record, &self.labels);
            warnings.extend(quality::inspect(&question, index));

            if quality::passes_strict_filter(&question) {
                questions.push(question);
            } else {
                warn!("question #{} failed quality floor, dropping", index + 1);
                dropped += 1;
            }
        }

        debug!(
            kept = questions.len(),
            dropped,
            warnings = warnings.len(),
            "sanitized response batch"
        );

        Ok(SanitizedBatch {
            questions,
            warnings,
            dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BloomLevel, Difficulty, ForgeError, Marks, QuestionType};

    fn sanitizer() -> Sanitizer {
        Sanitizer::new("Biology", "Unit 3 Notes", 3)
    }

    const GOOD_ANSWER: &str = "Mitosis is the process by which a single cell divides to produce two genetically identical daughter cells.";

    fn good_record(question: &str) -> String {
        format!(
            r#"{{"question_text": "{question}", "answer_text": "{GOOD_ANSWER}",
               "difficulty_level": "EASY", "bloom_level": "REMEMBER",
               "question_type": "DIRECT", "marks": "TWO"}}"#
        )
    }

    #[test]
    fn test_clean_response() {
        let raw = format!(
            r#"{{"questions": [{}]}}"#,
            good_record("What is mitosis in cell biology?")
        );
        let batch = sanitizer().sanitize(&raw).unwrap();

        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.dropped, 0);
        assert!(batch.warnings.is_empty());

        let q = &batch.questions[0];
        // Plain-text fields pass through unchanged
        assert_eq!(q.question_text, "What is mitosis in cell biology?");
        assert_eq!(q.answer_text, GOOD_ANSWER);
        assert_eq!(q.difficulty_level, Difficulty::Easy);
        assert_eq!(q.bloom_level, BloomLevel::Remember);
        assert_eq!(q.question_type, QuestionType::Direct);
        assert_eq!(q.marks, Marks::Two);
        assert_eq!(q.course_name, "Biology");
        assert_eq!(q.material_name, "Unit 3 Notes");
        assert_eq!(q.unit_number, 3);
    }

    #[test]
    fn test_fenced_response_with_prose() {
        let raw = format!(
            "Here are your questions:\n```json\n{{\"questions\": [{}]}}\n```",
            good_record("What is mitosis in cell biology?")
        );
        let batch = sanitizer().sanitize(&raw).unwrap();
        assert_eq!(batch.questions.len(), 1);
    }

    #[test]
    fn test_missing_questions_key_is_empty_not_error() {
        let batch = sanitizer().sanitize(r#"{"result": "done"}"#).unwrap();
        assert!(batch.questions.is_empty());
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn test_empty_questions_array_is_empty_not_error() {
        let batch = sanitizer().sanitize(r#"{"questions": []}"#).unwrap();
        assert!(batch.questions.is_empty());
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = sanitizer().sanitize("Sorry, I cannot help.").unwrap_err();
        assert!(matches!(err, ForgeError::Parse { .. }));
    }

    #[test]
    fn test_bad_records_dropped_good_ones_kept() {
        let raw = format!(
            r#"{{"questions": [{}, {{"question_text": "Hm?", "answer_text": "No."}}, "just a string"]}}"#,
            good_record("What is mitosis in cell biology?")
        );
        let batch = sanitizer().sanitize(&raw).unwrap();
        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.dropped, 2);
    }

    #[test]
    fn test_warnings_survive_for_kept_questions() {
        // Valid enough to keep, but Bloom band does not match difficulty
        let raw = format!(
            r#"{{"questions": [{{"question_text": "What is mitosis in cell biology?",
                "answer_text": "{GOOD_ANSWER}",
                "difficulty_level": "EASY", "bloom_level": "CREATE"}}]}}"#
        );
        let batch = sanitizer().sanitize(&raw).unwrap();
        assert_eq!(batch.questions.len(), 1);
        assert!(batch
            .warnings
            .iter()
            .any(|w| matches!(w, QualityWarning::BloomMismatch { .. })));
    }
}
