//! Unified Error Type System
//!
//! Centralized error types for the question-generation pipeline.
//!
//! ## Taxonomy
//!
//! - **InvalidInput**: empty material or zero-count request (fail fast)
//! - **Config**: bad configuration or missing credential (fail fast)
//! - **Parse**: backend response not interpretable (retried per chunk)
//! - **Backend**: transport/API failure from a backend (retried per chunk)
//! - **GenerationFailed**: terminal, zero usable questions after all retries
//!
//! ## Design Principles
//!
//! - Single unified error type (ForgeError) for the entire crate
//! - Retryability is a property of the variant, driving the orchestrator loop
//! - Quality findings are warnings carried in return values, never errors
//! - No panic/unwrap outside tests

use thiserror::Error;

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ForgeError {
    /// Material content or request parameters unusable; never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration problem, including a missing backend credential.
    #[error("Config error: {0}")]
    Config(String),

    /// Backend response could not be interpreted as the expected JSON shape.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Transport or API failure from a completion backend.
    #[error("Backend error [{provider}]: {message}")]
    Backend { provider: String, message: String },

    /// Zero usable questions after exhausting all chunks and retries.
    #[error("Generation failed: no usable questions produced (requested {requested})")]
    GenerationFailed { requested: u32 },
}

pub type Result<T> = std::result::Result<T, ForgeError>;

// =============================================================================
// Helper Constructors
// =============================================================================

impl ForgeError {
    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a backend error with provider context
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Check if the per-chunk retry loop may consume this error.
    ///
    /// Parse and backend failures are recoverable by another attempt;
    /// everything else surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Backend { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = ForgeError::invalid_input("content is empty");
        assert_eq!(err.to_string(), "Invalid input: content is empty");

        let err = ForgeError::backend("ollama", "connection refused");
        assert_eq!(
            err.to_string(),
            "Backend error [ollama]: connection refused"
        );

        let err = ForgeError::GenerationFailed { requested: 12 };
        assert!(err.to_string().contains("requested 12"));
    }

    #[test]
    fn test_retryability() {
        assert!(ForgeError::parse("no JSON object found").is_retryable());
        assert!(ForgeError::backend("gemini", "503").is_retryable());
        assert!(!ForgeError::invalid_input("empty").is_retryable());
        assert!(!ForgeError::config("missing API key").is_retryable());
        assert!(!ForgeError::GenerationFailed { requested: 5 }.is_retryable());
    }
}
