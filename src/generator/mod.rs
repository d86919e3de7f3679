//! Generation Orchestrator
//!
//! Drives the full pipeline for one material: chunk the content, split the
//! requested counts across chunks, call the completion backend per chunk
//! with retries, sanitize every response, and accumulate until the request
//! is satisfied or attempts run out.
//!
//! ## Flow
//!
//! 1. Validate the request, then chunk at the configured token budget
//! 2. Split the total evenly across chunks (ceiling division); every quota
//!    axis is apportioned to the chunk's share by largest remainder, so a
//!    nonzero ask always yields a nonzero chunk request
//! 3. Chunks run sequentially. Per chunk, up to `max_attempts` calls:
//!    parse and backend failures are consumed and retried with increasing
//!    backoff and a reduced temperature; a short batch triggers a re-ask
//!    scaled down to the remainder
//! 4. Results concatenate in chunk order and are truncated to the
//!    requested total
//!
//! Partial delivery is a success with a smaller batch. Only zero usable
//! questions after every chunk and retry is an error.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::ai::prompt::{SYSTEM_INSTRUCTIONS, build_generation_prompt};
use crate::ai::provider::{SamplingOptions, SharedBackend};
use crate::ai::sanitizer::{QualityWarning, Sanitizer};
use crate::chunker::chunk_content;
use crate::config::Config;
use crate::types::{ForgeError, GeneratedQuestion, GenerationRequest, Result};

/// The outcome of one full generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Questions delivered, in chunk order, truncated to the request total
    pub questions: Vec<GeneratedQuestion>,
    /// Quality diagnostics accumulated across all responses
    pub warnings: Vec<QualityWarning>,
    /// The total originally requested
    pub requested: u32,
    /// Number of chunks the material was split into
    pub chunks: usize,
}

impl GenerationOutcome {
    /// Whether fewer questions were delivered than requested.
    pub fn is_partial(&self) -> bool {
        (self.questions.len() as u32) < self.requested
    }
}

/// Orchestrates chunked, retried question generation against one backend.
pub struct QuestionGenerator {
    backend: SharedBackend,
    config: Config,
}

impl QuestionGenerator {
    pub fn new(backend: SharedBackend, config: Config) -> Self {
        Self { backend, config }
    }

    /// Run the full pipeline for one request.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        request.validate()?;

        let requested = request.total_questions();
        let chunks = chunk_content(&request.content, &self.config.chunking.to_options())?;
        info!(
            chunks = chunks.len(),
            requested,
            backend = self.backend.name(),
            "starting generation"
        );

        // Even split, ceiling division; the last chunks absorb the shortfall
        // by asking only for what is still missing.
        let per_chunk_ask = requested.div_ceil(chunks.len() as u32);

        let mut questions: Vec<GeneratedQuestion> = Vec::with_capacity(requested as usize);
        let mut warnings = Vec::new();

        for chunk in &chunks {
            let remaining = requested.saturating_sub(questions.len() as u32);
            if remaining == 0 {
                break;
            }
            let ask = per_chunk_ask.min(remaining);
            let chunk_request = request.scaled_for_chunk(chunk.content.clone(), ask);

            debug!(
                chunk_id = chunk.id,
                title = %chunk.title,
                ask,
                "generating for chunk"
            );

            let (mut batch, mut batch_warnings) = self.generate_for_chunk(&chunk_request).await?;
            if batch.is_empty() {
                warn!(chunk_id = chunk.id, "chunk produced no usable questions");
            }
            questions.append(&mut batch);
            warnings.append(&mut batch_warnings);
        }

        questions.truncate(requested as usize);

        if questions.is_empty() {
            return Err(ForgeError::GenerationFailed { requested });
        }

        info!(
            delivered = questions.len(),
            requested,
            "generation complete"
        );

        Ok(GenerationOutcome {
            questions,
            warnings,
            requested,
            chunks: chunks.len(),
        })
    }

    /// Generate for one chunk with retries and remainder re-asks.
    ///
    /// Retryable failures (parse, backend) are consumed here; a short batch
    /// is not a failure and leads to a re-ask scaled to the remainder. The
    /// returned batch is truncated to the chunk's target.
    async fn generate_for_chunk(
        &self,
        chunk_request: &GenerationRequest,
    ) -> Result<(Vec<GeneratedQuestion>, Vec<QualityWarning>)> {
        let target = chunk_request.total_questions();
        let sanitizer = Sanitizer::from_request(chunk_request);
        let base_sampling = SamplingOptions::from(&self.config.sampling);
        let retry = &self.config.generation;

        let mut collected: Vec<GeneratedQuestion> = Vec::new();
        let mut warnings = Vec::new();
        let mut current = chunk_request.clone();

        for attempt in 1..=retry.max_attempts {
            if attempt > 1 {
                self.backoff(attempt - 1).await;
            }

            // Lower temperature on retries for more literal output
            let sampling = if attempt == 1 {
                base_sampling
            } else {
                base_sampling.with_temperature(retry.retry_temperature)
            };

            let prompt = build_generation_prompt(&current);
            let batch = match self.backend.complete(SYSTEM_INSTRUCTIONS, &prompt, &sampling).await {
                Ok(response) => match sanitizer.sanitize(&response.text) {
                    Ok(batch) => batch,
                    Err(e) if e.is_retryable() => {
                        warn!(attempt, error = %e, "response unusable, retrying");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_retryable() => {
                    warn!(attempt, error = %e, "backend call failed, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            };

            warnings.extend(batch.warnings);
            collected.extend(batch.questions);

            let have = collected.len() as u32;
            if have >= target {
                break;
            }

            // Re-ask only for the shortfall, apportioning every axis down
            // from what this attempt asked for.
            let remaining = target - have;
            debug!(attempt, have, remaining, "short batch, re-asking for remainder");
            current = current.scaled_for_chunk(current.content.clone(), remaining);
        }

        collected.truncate(target as usize);
        Ok((collected, warnings))
    }

    /// Sleep for a strictly increasing, jittered backoff delay.
    async fn backoff(&self, multiplier: u32) {
        let retry = &self.config.generation;
        let jitter = if retry.max_jitter_ms > 0 {
            rand::rng().random_range(0..=retry.max_jitter_ms)
        } else {
            0
        };
        let delay = retry.base_delay_ms * u64::from(multiplier) + jitter;
        debug!(delay_ms = delay, "backing off before retry");
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{CompletionBackend, CompletionResponse};
    use crate::types::{BloomQuota, DifficultyQuota, TypeQuota};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Backend that replays scripted responses in order.
    struct ScriptedBackend {
        responses: Mutex<Vec<String>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<String>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _system_instructions: &str,
            _prompt: &str,
            _sampling: &SamplingOptions,
        ) -> Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop();
            match next {
                Some(text) => Ok(CompletionResponse {
                    text,
                    elapsed_ms: 1,
                    model: "scripted".to_string(),
                    backend: "mock".to_string(),
                }),
                None => Err(ForgeError::backend("mock", "script exhausted")),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.generation.base_delay_ms = 1;
        config.generation.max_jitter_ms = 0;
        config
    }

    fn request(easy: u32, medium: u32, hard: u32) -> GenerationRequest {
        let difficulty = DifficultyQuota::new(easy, medium, hard);
        let total = difficulty.total();
        GenerationRequest {
            content: "Mitosis is the process of cell division in eukaryotes.".to_string(),
            course_name: "Biology".to_string(),
            material_name: "Unit 3 Notes".to_string(),
            unit_number: 3,
            difficulty,
            bloom: BloomQuota::all_understand(total),
            question_type: TypeQuota::all_direct(total),
        }
    }

    /// A JSON response carrying `n` questions that clear the quality floor.
    fn response_with(n: usize) -> String {
        let records: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"question_text": "What is the role of phase number {i} in mitosis?",
                        "answer_text": "Phase {i} contributes to division by organizing and separating chromosomes so each daughter cell receives one complete identical set of genetic material.",
                        "difficulty_level": "EASY", "bloom_level": "REMEMBER",
                        "question_type": "DIRECT", "marks": "TWO"}}"#
                )
            })
            .collect();
        format!(r#"{{"questions": [{}]}}"#, records.join(","))
    }

    #[tokio::test]
    async fn test_single_call_success() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![response_with(2)]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let outcome = generator.generate(&request(2, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(outcome.requested, 2);
        assert!(!outcome.is_partial());
        assert_eq!(outcome.chunks, 1);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_unparseable_response() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![
            "I'm sorry, I can't do that.".to_string(),
            response_with(2),
        ]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let outcome = generator.generate(&request(2, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_triggers_retry() {
        // A well-formed response with zero questions is not a parse error,
        // but it leaves the chunk short and must drive a second call.
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![
            r#"{"questions": []}"#.to_string(),
            response_with(2),
        ]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let outcome = generator.generate(&request(2, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_one_per_tier_request_survives_many_chunks() {
        // Six sections at a 60-token budget split into several chunks, so
        // each chunk's share of a {1,1,1} request is a single question.
        // Apportionment must keep every per-chunk ask nonzero instead of
        // rounding the whole request down to nothing.
        let material: String = (1..=6)
            .map(|i| {
                format!(
                    "## Phase {i}\nDuring phase {i} the chromosomes condense and \
                     align while the spindle apparatus organizes the division \
                     machinery of the dividing cell.\n\n"
                )
            })
            .collect();

        let mut config = fast_config();
        config.chunking.max_tokens_per_chunk = 60;
        config.chunking.min_tokens_per_chunk = 5;

        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![response_with(1); 8]));
        let generator = QuestionGenerator::new(backend, config);

        let mut request = request(1, 1, 1);
        request.content = material;

        let outcome = generator.generate(&request).await.unwrap();
        assert!(outcome.chunks > 1);
        assert_eq!(outcome.questions.len(), 3);
        assert!(!outcome.is_partial());
    }

    #[tokio::test]
    async fn test_short_batch_triggers_remainder_reask() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![
            response_with(1),
            response_with(2),
        ]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let outcome = generator.generate(&request(3, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 3);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_oversized_batch_truncated() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![response_with(5)]));
        let generator = QuestionGenerator::new(backend, fast_config());

        let outcome = generator.generate(&request(2, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 2);
    }

    #[tokio::test]
    async fn test_all_attempts_fail_is_generation_failed() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![
            "garbage".to_string(),
            "more garbage".to_string(),
            "still garbage".to_string(),
        ]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let err = generator.generate(&request(2, 0, 0)).await.unwrap_err();
        assert!(matches!(err, ForgeError::GenerationFailed { requested: 2 }));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_partial_delivery_is_success() {
        // One usable question, then nothing but failures
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![
            response_with(1),
            "garbage".to_string(),
            "garbage".to_string(),
        ]));
        let generator = QuestionGenerator::new(backend, fast_config());

        let outcome = generator.generate(&request(3, 0, 0)).await.unwrap();
        assert_eq!(outcome.questions.len(), 1);
        assert!(outcome.is_partial());
    }

    #[tokio::test]
    async fn test_invalid_request_never_calls_backend() {
        let backend = std::sync::Arc::new(ScriptedBackend::new(vec![]));
        let generator = QuestionGenerator::new(backend.clone(), fast_config());

        let err = generator.generate(&request(0, 0, 0)).await.unwrap_err();
        assert!(matches!(err, ForgeError::InvalidInput(_)));
        assert_eq!(backend.calls(), 0);
    }
}
