//! Structural Chunker
//!
//! Splits a document into heading-delimited sections, then greedily merges
//! adjacent sections into chunks bounded by a max-token budget.
//!
//! ## Strategy
//! - Small documents skip splitting entirely: one chunk, content verbatim
//! - A heading is a line with 1-6 leading `#`, whitespace, then text
//! - Content before the first heading becomes an "Introduction" section
//! - Adjacent sections merge while the running token estimate stays within
//!   budget; the accumulator is sealed when the next section would overflow
//! - A trailing accumulator below the minimum token bound is dropped (the
//!   loss is logged at warn level)
//!
//! A sealed chunk's `heading_level` comes from the section that forced the
//! seal, not from its own sections; the trailing chunk falls back to its own
//! first section's level. Known off-by-one artifact, kept for compatibility.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::ai::tokenizer::estimate_tokens;
use crate::constants::chunking;
use crate::types::{ForgeError, Result};

// =============================================================================
// Options
// =============================================================================

/// Splitting strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMethod {
    /// Heading-delimited sections with greedy token-budgeted merging
    #[default]
    Structural,
}

/// Configuration for one chunking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Upper bound (estimated tokens) before a chunk is sealed
    pub max_tokens_per_chunk: usize,
    /// Lower bound below which a trailing chunk is dropped
    pub min_tokens_per_chunk: usize,
    /// Reserved overlap budget; not structurally enforced
    pub overlap_tokens: usize,
    /// Splitting strategy
    pub method: ChunkingMethod,
    /// Advisory flag; carried for callers, not interpreted here
    pub preserve_context: bool,
}

impl Default for ChunkingOptions {
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

impl ChunkingOptions {
    /// Invariant: `max_tokens_per_chunk > min_tokens_per_chunk > 0`.
    pub fn validate(&self) -> Result<()> {
        if self.min_tokens_per_chunk == 0 {
            return Err(ForgeError::invalid_input(
                "min_tokens_per_chunk must be greater than 0",
            ));
        }
        if self.max_tokens_per_chunk <= self.min_tokens_per_chunk {
            return Err(ForgeError::invalid_input(format!(
                "max_tokens_per_chunk ({}) must exceed min_tokens_per_chunk ({})",
                self.max_tokens_per_chunk, self.min_tokens_per_chunk
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Chunk
// =============================================================================

/// Metadata recorded when a chunk is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Heading level (1-6) attributed to this chunk
    pub heading_level: u8,
    /// Whether more than one section was merged in
    pub merged: bool,
    /// Up to 5 most frequent words longer than 4 characters
    pub keywords: Vec<String>,
}

/// A bounded span of source document text. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential identifier, starting at 1 in output order
    pub id: u32,
    /// Merged section headings joined by " > "
    pub title: String,
    /// Raw text content
    pub content: String,
    /// First source line covered (1-based, inclusive)
    pub start_line: usize,
    /// Last source line covered (1-based, inclusive)
    pub end_line: usize,
    /// Estimated token count (sum of merged section estimates)
    pub tokens: usize,
    pub metadata: ChunkMetadata,
}

// =============================================================================
// Chunking
// =============================================================================

/// Split `content` into token-budgeted chunks.
///
/// Fails with `InvalidInput` when the content is empty or all-whitespace,
/// or when the options invariant is violated. Idempotent: identical input
/// and options produce identical chunks.
pub fn chunk_content(content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>> {
    options.validate()?;

    if content.trim().is_empty() {
        return Err(ForgeError::invalid_input(
            "content is empty or whitespace-only",
        ));
    }

    // Fast path: the whole document fits in one chunk.
    let total_tokens = estimate_tokens(content);
    if total_tokens <= options.max_tokens_per_chunk {
        debug!(tokens = total_tokens, "document fits in a single chunk");
        return Ok(vec![Chunk {
            id: 1,
            title: chunking::FULL_CONTENT_TITLE.to_string(),
            content: content.to_string(),
            start_line: 1,
            end_line: content.lines().count().max(1),
            tokens: total_tokens,
            metadata: ChunkMetadata {
                heading_level: 1,
                merged: false,
                keywords: extract_keywords(content, chunking::MAX_KEYWORDS),
            },
        }]);
    }

    let sections = split_sections(content);
    let mut chunks: Vec<Chunk> = Vec::new();

    let mut iter = sections.into_iter();
    // Non-empty content always yields at least one section.
    let Some(first) = iter.next() else {
        return Err(ForgeError::invalid_input("content produced no sections"));
    };
    let mut acc = Accumulator::start(first);

    for section in iter {
        if acc.tokens + section.tokens <= options.max_tokens_per_chunk {
            acc.merge(section);
        } else {
            // Heading level comes from the section that forced the seal.
            let sealed = acc.seal(chunks.len() as u32 + 1, section.level);
            debug!(
                id = sealed.id,
                tokens = sealed.tokens,
                lines = format!("{}-{}", sealed.start_line, sealed.end_line),
                "sealed chunk"
            );
            chunks.push(sealed);
            acc = Accumulator::start(section);
        }
    }

    if acc.tokens >= options.min_tokens_per_chunk {
        let level = acc.first_level;
        chunks.push(acc.seal(chunks.len() as u32 + 1, level));
    } else {
        warn!(
            tokens = acc.tokens,
            min = options.min_tokens_per_chunk,
            lines = format!("{}-{}", acc.start_line, acc.end_line),
            "dropping trailing content below minimum chunk size"
        );
    }

    Ok(chunks)
}

// =============================================================================
// Sections
// =============================================================================

/// One heading-delimited span of the source document.
#[derive(Debug)]
struct Section {
    title: String,
    level: u8,
    text: String,
    start_line: usize,
    end_line: usize,
    tokens: usize,
}

/// Parse a heading line: 1-6 `#`, at least one whitespace, non-empty text.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((hashes as u8, title))
}

/// Split into ordered sections at heading lines. Content before the first
/// heading becomes an "Introduction" section at level 1.
fn split_sections(content: &str) -> Vec<Section> {
    struct Builder {
        title: String,
        level: u8,
        lines: Vec<String>,
        start_line: usize,
    }

    impl Builder {
        fn finish(self, end_line: usize) -> Section {
            let text = self.lines.join("\n");
            let tokens = estimate_tokens(&text);
            Section {
                title: self.title,
                level: self.level,
                text,
                start_line: self.start_line,
                end_line,
                tokens,
            }
        }
    }

    let mut sections = Vec::new();
    let mut current: Option<Builder> = None;
    let mut line_no = 0;

    for (idx, line) in content.lines().enumerate() {
        line_no = idx + 1;
        if let Some((level, title)) = parse_heading(line) {
            if let Some(builder) = current.take() {
                sections.push(builder.finish(line_no - 1));
            }
            current = Some(Builder {
                title: title.to_string(),
                level,
                lines: vec![line.to_string()],
                start_line: line_no,
            });
        } else {
            match current.as_mut() {
                Some(builder) => builder.lines.push(line.to_string()),
                None => {
                    current = Some(Builder {
                        title: chunking::INTRODUCTION_TITLE.to_string(),
                        level: 1,
                        lines: vec![line.to_string()],
                        start_line: line_no,
                    });
                }
            }
        }
    }

    if let Some(builder) = current.take() {
        sections.push(builder.finish(line_no));
    }

    sections
}

// =============================================================================
// Greedy Merge Accumulator
// =============================================================================

struct Accumulator {
    title: String,
    content: String,
    start_line: usize,
    end_line: usize,
    tokens: usize,
    section_count: usize,
    first_level: u8,
}

impl Accumulator {
    fn start(section: Section) -> Self {
        Self {
            title: section.title,
            content: section.text,
            start_line: section.start_line,
            end_line: section.end_line,
            tokens: section.tokens,
            section_count: 1,
            first_level: section.level,
        }
    }

    fn merge(&mut self, section: Section) {
        self.title.push_str(chunking::TITLE_SEPARATOR);
        self.title.push_str(&section.title);
        self.content.push('\n');
        self.content.push_str(&section.text);
        self.end_line = section.end_line;
        self.tokens += section.tokens;
        self.section_count += 1;
    }

    fn seal(self, id: u32, heading_level: u8) -> Chunk {
        let keywords = extract_keywords(&self.content, chunking::MAX_KEYWORDS);
        Chunk {
            id,
            title: self.title,
            content: self.content,
            start_line: self.start_line,
            end_line: self.end_line,
            tokens: self.tokens,
            metadata: ChunkMetadata {
                heading_level,
                merged: self.section_count > 1,
                keywords,
            },
        }
    }
}

// =============================================================================
// Keyword Extraction
// =============================================================================

/// Crude term-frequency keyword proxy: lowercase, strip non-word characters,
/// keep words longer than 4 characters, rank by frequency. Ties break by
/// first appearance so extraction stays deterministic.
fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for word in cleaned.split_whitespace() {
        if word.chars().count() <= chunking::KEYWORD_MIN_LEN {
            continue;
        }
        let entry = counts.entry(word).or_insert(0);
        if *entry == 0 {
            order.push(word);
        }
        *entry += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|w| (w, counts[w])).collect();
    // Stable sort keeps first-appearance order for equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
