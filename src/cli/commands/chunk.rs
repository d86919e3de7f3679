//! Chunk Command
//!
//! Dry-run view of the chunking stage: show how a material file splits
//! and, when counts are given, how the quotas would spread across chunks.
//!
//! Usage:
//!   examforge chunk -f notes.md
//!   examforge chunk -f notes.md --easy 4 --medium 4 --hard 2

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use crate::chunker::chunk_content;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::distributor::{QuotaRequirements, distribute_across_chunks};
use crate::types::{BloomQuota, DifficultyQuota, TypeQuota};

#[derive(Debug, Clone)]
pub struct ChunkOptions {
    pub file: PathBuf,
    pub difficulty: DifficultyQuota,
}

pub fn run(options: ChunkOptions) -> anyhow::Result<()> {
    let output = Output::new();
    let config = ConfigLoader::load()?;

    let content = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;

    let chunks = chunk_content(&content, &config.chunking.to_options())?;

    output.header(&format!("Chunks for {}", options.file.display()));
    println!(
        "{}",
        style(format!(
            "{:>4}  {:>7}  {:>11}  {}",
            "id", "tokens", "lines", "title"
        ))
        .dim()
    );
    for chunk in &chunks {
        println!(
            "{:>4}  {:>7}  {:>5}-{:<5}  {}",
            chunk.id, chunk.tokens, chunk.start_line, chunk.end_line, chunk.title
        );
        if !chunk.metadata.keywords.is_empty() {
            println!(
                "      {}",
                style(format!("keywords: {}", chunk.metadata.keywords.join(", "))).dim()
            );
        }
    }
    output.info(&format!("{} chunk(s) total", chunks.len()));

    // Distribution preview only when counts were requested
    if options.difficulty.total() > 0 {
        let total = options.difficulty.total();
        let requirements = QuotaRequirements {
            difficulty: options.difficulty,
            bloom: BloomQuota::all_understand(total),
            question_type: TypeQuota::all_direct(total),
        };
        let allocations = distribute_across_chunks(&chunks, &requirements);

        output.section("Quota Distribution (by token share)");
        println!(
            "{}",
            style(format!(
                "{:>4}  {:>5}  {:>6}  {:>5}  {:>5}",
                "id", "easy", "medium", "hard", "total"
            ))
            .dim()
        );
        for allocation in &allocations {
            println!(
                "{:>4}  {:>5}  {:>6}  {:>5}  {:>5}",
                allocation.chunk_id,
                allocation.difficulty.easy,
                allocation.difficulty.medium,
                allocation.difficulty.hard,
                allocation.difficulty.total()
            );
        }
    }

    Ok(())
}
