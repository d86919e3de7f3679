//! Completion Backend Abstraction
//!
//! Defines the `CompletionBackend` trait for free-form text generation.
//! The core treats every backend as a black box: system instructions plus a
//! prompt go in, raw text comes out. There is no streaming and no
//! backend-specific response shape beyond "text that may contain JSON
//! embedded in markdown" — the sanitizer handles the rest.
//!
//! ## Backends
//!
//! - `ollama`: local HTTP completion endpoint
//! - `gemini`: hosted generative API
//!
//! Selection happens once at composition time via `create_backend`.

mod gemini;
mod ollama;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{BackendConfig, BackendKind, SamplingConfig};
use crate::types::Result;

// =============================================================================
// Sampling Options
// =============================================================================

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&SamplingConfig> for SamplingOptions {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

impl SamplingOptions {
    /// Copy with a different temperature (used for retry attempts).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

// =============================================================================
// Completion Response
// =============================================================================

/// Raw completion output plus timing and origin metadata.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Free-form response text; may contain fenced JSON, prose, anything
    pub text: String,
    /// Wall-clock response time in milliseconds
    pub elapsed_ms: u64,
    /// Model that produced the response
    pub model: String,
    /// Backend name for logging
    pub backend: String,
}

/// Shared backend handle for injection into the generator.
pub type SharedBackend = Arc<dyn CompletionBackend>;

// =============================================================================
// Completion Backend Trait
// =============================================================================

/// A text-completion service invoked with a prompt, returning raw text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion call to completion (no streaming).
    async fn complete(
        &self,
        system_instructions: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<CompletionResponse>;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the backend is reachable and usable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared backend from configuration.
///
/// This is the configuration-time selection point; a missing credential
/// surfaces here as a `Config` error, before any generation starts.
pub fn create_backend(config: &BackendConfig) -> Result<SharedBackend> {
    match config.provider {
        BackendKind::Ollama => Ok(Arc::new(OllamaBackend::new(config)?)),
        BackendKind::Gemini => Ok(Arc::new(GeminiBackend::new(config)?)),
    }
}
