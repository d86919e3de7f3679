//! ExamForge - AI-Driven Exam Question Generation
//!
//! Generates exam questions from course material through a completion
//! backend, with structural chunking for large documents, quota-aware
//! orchestration, and aggressive response sanitization.
//!
//! ## Pipeline
//!
//! 1. **Chunking**: split material at markdown headings under a token
//!    budget, keeping line spans and per-chunk keywords
//! 2. **Distribution**: spread requested counts across chunks
//! 3. **Generation**: one backend call per chunk with retries, reduced
//!    retry temperature, and remainder re-asks
//! 4. **Sanitization**: tolerate malformed responses, normalize fields,
//!    drop anything below the quality floor
//!
//! ## Quick Start
//!
//! ```ignore
//! use examforge::ai::provider::create_backend;
//! use examforge::config::ConfigLoader;
//! use examforge::generator::QuestionGenerator;
//! use examforge::types::{BloomQuota, DifficultyQuota, GenerationRequest, TypeQuota};
//!
//! let config = ConfigLoader::load()?;
//! let backend = create_backend(&config.backend)?;
//! let generator = QuestionGenerator::new(backend, config);
//!
//! let request = GenerationRequest {
//!     content: material,
//!     course_name: "Biology".into(),
//!     material_name: "Unit 3 Notes".into(),
//!     unit_number: 3,
//!     difficulty: DifficultyQuota::new(4, 4, 2),
//!     bloom: BloomQuota::all_understand(10),
//!     question_type: TypeQuota::all_direct(10),
//! };
//! let outcome = generator.generate(&request).await?;
//! ```
//!
//! ## Modules
//!
//! - [`chunker`]: structural markdown chunking
//! - [`distributor`]: token-share quota distribution
//! - [`generator`]: the orchestration loop
//! - [`ai`]: backends, prompts, sanitization, token estimation
//! - [`config`]: layered configuration

pub mod ai;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod constants;
pub mod distributor;
pub mod generator;
pub mod types;

pub use ai::{CompletionBackend, SharedBackend, create_backend};
pub use chunker::{Chunk, ChunkingOptions, chunk_content};
pub use config::{Config, ConfigLoader};
pub use distributor::{ChunkQuotas, QuotaRequirements, distribute_across_chunks};
pub use generator::{GenerationOutcome, QuestionGenerator};
pub use types::{ForgeError, GeneratedQuestion, GenerationRequest, Result};
