//! Generate Command
//!
//! End-to-end run for one material file: load config, build the request
//! from CLI counts, run the orchestrator, and emit a JSON report.
//!
//! Usage:
//!   examforge generate -f notes.md --course "Biology" --unit 3 --easy 4 --medium 4 --hard 2

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;

use crate::ai::provider::create_backend;
use crate::cli::ui::Output;
use crate::config::{BackendKind, ConfigLoader};
use crate::generator::{GenerationOutcome, QuestionGenerator};
use crate::types::{
    BloomQuota, Difficulty, DifficultyQuota, GeneratedQuestion, GenerationRequest, TypeQuota,
};

/// All knobs for one generate run, straight from the CLI.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub file: PathBuf,
    pub course: String,
    pub material: Option<String>,
    pub unit: u32,

    pub difficulty: DifficultyQuota,
    pub bloom: BloomQuota,
    pub question_type: TypeQuota,

    pub provider: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
}

/// JSON report written for one run.
#[derive(Debug, Serialize)]
struct GenerationReport {
    generated_at: chrono::DateTime<chrono::Utc>,
    backend: String,
    model: String,
    course_name: String,
    material_name: String,
    unit_number: u32,
    requested: u32,
    delivered: usize,
    chunks: usize,
    questions: Vec<GeneratedQuestion>,
}

pub async fn run(options: GenerateOptions) -> anyhow::Result<()> {
    let output = Output::new();

    let mut config = ConfigLoader::load()?;
    if let Some(provider) = &options.provider {
        config.backend.provider = BackendKind::from_str(provider).map_err(anyhow::Error::msg)?;
    }
    if let Some(model) = &options.model {
        config.backend.model = Some(model.clone());
    }

    let content = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;
    let material_name = options.material.clone().unwrap_or_else(|| {
        options
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("material")
            .to_string()
    });

    let request = build_request(&options, content, material_name);

    let backend = create_backend(&config.backend)?;
    output.info(&format!(
        "Generating {} questions with {} ({})",
        request.total_questions(),
        backend.name(),
        backend.model()
    ));

    let generator = QuestionGenerator::new(backend.clone(), config);
    let outcome = generator.generate(&request).await?;

    report_outcome(&output, &outcome);

    let report = GenerationReport {
        generated_at: chrono::Utc::now(),
        backend: backend.name().to_string(),
        model: backend.model().to_string(),
        course_name: request.course_name.clone(),
        material_name: request.material_name.clone(),
        unit_number: request.unit_number,
        requested: outcome.requested,
        delivered: outcome.questions.len(),
        chunks: outcome.chunks,
        questions: outcome.questions,
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            output.success(&format!("Wrote report to {}", path.display()));
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Assemble the request. A Bloom or type axis left entirely at zero gets
/// the whole total on its default bucket (UNDERSTAND / DIRECT).
fn build_request(
    options: &GenerateOptions,
    content: String,
    material_name: String,
) -> GenerationRequest {
    let total = options.difficulty.total();
    let bloom = if options.bloom.total() == 0 {
        BloomQuota::all_understand(total)
    } else {
        options.bloom
    };
    let question_type = if options.question_type.total() == 0 {
        TypeQuota::all_direct(total)
    } else {
        options.question_type
    };

    GenerationRequest {
        content,
        course_name: options.course.clone(),
        material_name,
        unit_number: options.unit,
        difficulty: options.difficulty,
        bloom,
        question_type,
    }
}

fn report_outcome(output: &Output, outcome: &GenerationOutcome) {
    output.section("Generation Summary");
    output.count("Delivered", outcome.questions.len(), outcome.requested);
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let count = outcome
            .questions
            .iter()
            .filter(|q| q.difficulty_level == difficulty)
            .count();
        output.key_value(&difficulty.to_string(), &count.to_string());
    }
    output.key_value("Chunks", &outcome.chunks.to_string());

    if outcome.is_partial() {
        output.warning(&format!(
            "Delivered {} of {} requested questions; the backend could not satisfy the full quota",
            outcome.questions.len(),
            outcome.requested
        ));
    }
    for warning in &outcome.warnings {
        output.warning(&warning.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(difficulty: DifficultyQuota) -> GenerateOptions {
        GenerateOptions {
            file: PathBuf::from("notes.md"),
            course: "Biology".to_string(),
            material: None,
            unit: 3,
            difficulty,
            bloom: BloomQuota::default(),
            question_type: TypeQuota::default(),
            provider: None,
            model: None,
            output: None,
        }
    }

    #[test]
    fn test_zero_axes_default_to_understand_and_direct() {
        let request = build_request(
            &options(DifficultyQuota::new(2, 2, 1)),
            "content".to_string(),
            "notes".to_string(),
        );
        assert_eq!(request.bloom, BloomQuota::all_understand(5));
        assert_eq!(request.question_type, TypeQuota::all_direct(5));
    }

    #[test]
    fn test_explicit_axes_kept() {
        let mut opts = options(DifficultyQuota::new(2, 0, 0));
        opts.bloom = BloomQuota {
            apply: 2,
            ..BloomQuota::default()
        };
        let request = build_request(&opts, "content".to_string(), "notes".to_string());
        assert_eq!(request.bloom.apply, 2);
        assert_eq!(request.question_type, TypeQuota::all_direct(2));
    }
}
