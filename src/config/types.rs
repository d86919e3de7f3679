//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (platform config dir) and project-level configuration.

use serde::{Deserialize, Serialize};

use crate::chunker::{ChunkingMethod, ChunkingOptions};
use crate::constants::{backend, chunking, generation, network, sampling};
use crate::types::{ForgeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Completion backend settings
    pub backend: BackendConfig,

    /// Structural chunking settings
    pub chunking: ChunkingConfig,

    /// Retry/accumulation settings for the generator
    pub generation: GenerationConfig,

    /// Sampling defaults for completion calls
    pub sampling: SamplingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::default(),
            chunking: ChunkingConfig::default(),
            generation: GenerationConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForgeError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 {
            return Err(ForgeError::config(
                "backend timeout_secs must be greater than 0",
            ));
        }

        if !(0.0..=2.0).contains(&self.sampling.temperature) {
            return Err(ForgeError::config(format!(
                "sampling temperature must be between 0.0 and 2.0, got {}",
                self.sampling.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.sampling.top_p) {
            return Err(ForgeError::config(format!(
                "sampling top_p must be between 0.0 and 1.0, got {}",
                self.sampling.top_p
            )));
        }

        if self.generation.max_attempts == 0 {
            return Err(ForgeError::config(
                "generation max_attempts must be at least 1",
            ));
        }

        // Chunking invariant: max > min > 0
        self.chunking.to_options().validate().map_err(|e| {
            ForgeError::config(format!("chunking configuration invalid: {e}"))
        })?;

        Ok(())
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

/// Which completion backend to construct at composition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local HTTP completion endpoint
    #[default]
    Ollama,
    /// Hosted generative API
    Gemini,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Ollama => write!(f, "ollama"),
            BackendKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" => Ok(BackendKind::Gemini),
            _ => Err(format!(
                "Unknown backend: {}. Valid values: ollama, gemini",
                s
            )),
        }
    }
}

/// Completion backend settings.
///
/// The API key is never serialized to output and is redacted in debug
/// output; the Gemini backend converts it to a SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend to use: ollama or gemini
    pub provider: BackendKind,
    /// Model name (backend-specific); None uses the backend's default
    pub model: Option<String>,
    /// Endpoint / API base URL override
    pub endpoint: Option<String>,
    /// API key (Gemini). Never serialized to output for security
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendKind::Ollama,
            model: None,
            endpoint: None,
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Effective model name after defaulting.
    pub fn effective_model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, BackendKind::Ollama) => backend::OLLAMA_DEFAULT_MODEL,
            (None, BackendKind::Gemini) => backend::GEMINI_DEFAULT_MODEL,
        }
    }
}

// =============================================================================
// Chunking Configuration
// =============================================================================

/// Structural chunking settings (see `chunker::ChunkingOptions`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens_per_chunk: usize,
    pub min_tokens_per_chunk: usize,
    pub overlap_tokens: usize,
    pub method: ChunkingMethod,
    pub preserve_context: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: chunking::DEFAULT_MAX_TOKENS_PER_CHUNK,
            min_tokens_per_chunk: chunking::DEFAULT_MIN_TOKENS_PER_CHUNK,
            overlap_tokens: chunking::DEFAULT_OVERLAP_TOKENS,
            method: ChunkingMethod::Structural,
            preserve_context: true,
        }
    }
}

impl ChunkingConfig {
    /// Convert to the chunker's options type.
    pub fn to_options(&self) -> ChunkingOptions {
        ChunkingOptions {
            max_tokens_per_chunk: self.max_tokens_per_chunk,
            min_tokens_per_chunk: self.min_tokens_per_chunk,
            overlap_tokens: self.overlap_tokens,
            method: self.method,
            preserve_context: self.preserve_context,
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

/// Retry and backoff policy for per-chunk generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Total attempts per chunk (1 initial + retries)
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds; multiplied by attempt number
    pub base_delay_ms: u64,
    /// Upper bound for random backoff jitter in milliseconds
    pub max_jitter_ms: u64,
    /// Reduced temperature used from the second attempt onward
    pub retry_temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: generation::MAX_ATTEMPTS,
            base_delay_ms: generation::BASE_DELAY_MS,
            max_jitter_ms: generation::MAX_JITTER_MS,
            retry_temperature: generation::RETRY_TEMPERATURE,
        }
    }
}

// =============================================================================
// Sampling Configuration
// =============================================================================

/// Sampling defaults for completion calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: sampling::DEFAULT_TEMPERATURE,
            top_p: sampling::DEFAULT_TOP_P,
            max_output_tokens: sampling::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_catches_bad_ranges() {
        let mut config = Config::default();
        config.sampling.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chunking.min_tokens_per_chunk = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chunking.min_tokens_per_chunk = config.chunking.max_tokens_per_chunk;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("ollama".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert_eq!("GEMINI".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert!("openai".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config = BackendConfig {
            api_key: Some("super-secret".to_string()),
            ..BackendConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let config = BackendConfig {
            api_key: Some("super-secret".to_string()),
            ..BackendConfig::default()
        };
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("super-secret"));
    }

    #[test]
    fn test_effective_model_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.effective_model(), backend::OLLAMA_DEFAULT_MODEL);

        let config = BackendConfig {
            provider: BackendKind::Gemini,
            model: Some("gemini-1.5-pro".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(config.effective_model(), "gemini-1.5-pro");
    }
}
