//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Structural chunking constants
pub mod chunking {
    /// Default upper bound before a chunk is sealed (estimated tokens)
    pub const DEFAULT_MAX_TOKENS_PER_CHUNK: usize = 8000;

    /// Default lower bound below which a trailing chunk is dropped
    pub const DEFAULT_MIN_TOKENS_PER_CHUNK: usize = 100;

    /// Reserved overlap budget between adjacent chunks (not structurally enforced)
    pub const DEFAULT_OVERLAP_TOKENS: usize = 0;

    /// Maximum keywords recorded per chunk
    pub const MAX_KEYWORDS: usize = 5;

    /// Minimum word length (exclusive) for keyword extraction
    pub const KEYWORD_MIN_LEN: usize = 4;

    /// Separator used when merged section headings are joined into a title
    pub const TITLE_SEPARATOR: &str = " > ";

    /// Title of the single chunk returned on the small-document fast path
    pub const FULL_CONTENT_TITLE: &str = "Full Content";

    /// Title assigned to content appearing before the first heading
    pub const INTRODUCTION_TITLE: &str = "Introduction";
}

/// Generation retry policy constants
pub mod generation {
    /// Total attempts per chunk (1 initial + 2 retries)
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base backoff delay between attempts (milliseconds);
    /// multiplied by the attempt number for a strictly increasing delay
    pub const BASE_DELAY_MS: u64 = 1000;

    /// Upper bound for random jitter added to each backoff delay (milliseconds)
    pub const MAX_JITTER_MS: u64 = 250;

    /// Reduced sampling temperature used from the second attempt onward
    pub const RETRY_TEMPERATURE: f32 = 0.3;
}

/// Sampling defaults for completion backends
pub mod sampling {
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Default nucleus-sampling cutoff
    pub const DEFAULT_TOP_P: f32 = 0.95;

    /// Default output token ceiling
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
}

/// Sanitizer quality gates
pub mod sanitizer {
    /// Minimum question length (characters) for the strict filter
    pub const MIN_QUESTION_CHARS: usize = 10;

    /// Minimum answer length (characters) for the strict filter
    pub const MIN_ANSWER_CHARS: usize = 20;

    /// Phrases that mark a question or answer as placeholder output.
    /// Matched case-insensitively as substrings.
    pub const PLACEHOLDER_PHRASES: &[&str] = &[
        "lorem ipsum",
        "insert question",
        "insert answer",
        "your question here",
        "your answer here",
        "question goes here",
        "answer goes here",
        "sample question",
        "placeholder",
        "to be determined",
        "[tbd]",
        "[insert",
        "xxx",
    ];
}

/// Completion backend defaults
pub mod backend {
    /// Default local Ollama endpoint
    pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434";

    /// Default Ollama model
    pub const OLLAMA_DEFAULT_MODEL: &str = "llama3:latest";

    /// Default Gemini API base
    pub const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

    /// Default Gemini model
    pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

    /// Environment variable consulted when no Gemini API key is configured
    pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
