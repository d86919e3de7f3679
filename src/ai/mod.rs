//! AI Layer
//!
//! Everything that touches a completion backend: prompt construction,
//! the backend abstraction itself, response sanitization, and the token
//! estimation heuristic shared with the chunker.

pub mod prompt;
pub mod provider;
pub mod sanitizer;
pub mod tokenizer;

pub use provider::{
    CompletionBackend, CompletionResponse, SamplingOptions, SharedBackend, create_backend,
};
pub use sanitizer::{QualityWarning, SanitizedBatch, Sanitizer};
pub use tokenizer::estimate_tokens;
