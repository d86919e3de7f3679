//! Quota Distributor
//!
//! Allocates multiple independent quota axes across chunks proportionally
//! to each chunk's token share.
//!
//! ## Strategy
//! - Weight of chunk i = chunk[i].tokens / total tokens
//! - Non-last chunks receive round(total × weight) per counter
//! - The last chunk receives the residual, so per-counter totals reproduce
//!   the requested totals exactly
//! - Every allocation clamps to 0 after the arithmetic (a last-chunk deficit
//!   can go negative when earlier chunks over-round)
//!
//! Axes never mix: difficulty, Bloom, and question-type counters are each
//! distributed independently; only the chunk weighting is shared. Turning
//! the per-chunk axis totals into coherent question specs is the prompt
//! builder's job, not the distributor's.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunker::Chunk;
use crate::types::{BloomQuota, DifficultyQuota, TypeQuota};

/// The three requested quota axes for one generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRequirements {
    pub difficulty: DifficultyQuota,
    pub bloom: BloomQuota,
    pub question_type: TypeQuota,
}

/// Per-chunk allocation of every axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkQuotas {
    pub chunk_id: u32,
    pub difficulty: DifficultyQuota,
    pub bloom: BloomQuota,
    pub question_type: TypeQuota,
}

/// Distribute every axis of `requirements` across `chunks` by token share.
///
/// Returns one `ChunkQuotas` per chunk, in chunk order. For each axis and
/// counter the allocations sum to the requested total whenever the last
/// chunk's residual is non-negative; over-rounded earlier chunks clamp the
/// last chunk at 0 instead of going negative.
pub fn distribute_across_chunks(
    chunks: &[Chunk],
    requirements: &QuotaRequirements,
) -> Vec<ChunkQuotas> {
    if chunks.is_empty() {
        return Vec::new();
    }

    let total_tokens: usize = chunks.iter().map(|c| c.tokens).sum();
    let weights: Vec<f64> = if total_tokens == 0 {
        // Degenerate input: fall back to equal weights.
        vec![1.0 / chunks.len() as f64; chunks.len()]
    } else {
        chunks
            .iter()
            .map(|c| c.tokens as f64 / total_tokens as f64)
            .collect()
    };

    let difficulty = distribute_axis(requirements.difficulty.as_array(), &weights);
    let bloom = distribute_axis(requirements.bloom.as_array(), &weights);
    let question_type = distribute_axis(requirements.question_type.as_array(), &weights);

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let quotas = ChunkQuotas {
                chunk_id: chunk.id,
                difficulty: DifficultyQuota::from_array(difficulty[i]),
                bloom: BloomQuota::from_array(bloom[i]),
                question_type: TypeQuota::from_array(question_type[i]),
            };
            debug!(
                chunk_id = chunk.id,
                weight = weights[i],
                difficulty_total = quotas.difficulty.total(),
                "allocated chunk quotas"
            );
            quotas
        })
        .collect()
}

/// Distribute one axis's counters over the chunk weights.
///
/// Each counter is handled independently: rounded share for non-last chunks,
/// residual for the last, then clamped at 0.
fn distribute_axis<const N: usize>(totals: [u32; N], weights: &[f64]) -> Vec<[u32; N]> {
    let chunk_count = weights.len();
    let mut allocations = vec![[0u32; N]; chunk_count];

    for counter in 0..N {
        let total = totals[counter];
        let mut allocated: i64 = 0;

        for (i, &weight) in weights.iter().enumerate() {
            let share = if i + 1 == chunk_count {
                i64::from(total) - allocated
            } else {
                (f64::from(total) * weight).round() as i64
            };
            let clamped = share.max(0);
            allocations[i][counter] = clamped as u32;
            allocated += clamped;
        }
    }

    allocations
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkMetadata;
    use proptest::prelude::*;

    fn chunk(id: u32, tokens: usize) -> Chunk {
        Chunk {
            id,
            title: format!("Section {id}"),
            content: String::new(),
            start_line: 1,
            end_line: 1,
            tokens,
            metadata: ChunkMetadata {
                heading_level: 1,
                merged: false,
                keywords: Vec::new(),
            },
        }
    }

    fn requirements(easy: u32, medium: u32, hard: u32) -> QuotaRequirements {
        QuotaRequirements {
            difficulty: DifficultyQuota::new(easy, medium, hard),
            bloom: BloomQuota::all_understand(easy + medium + hard),
            question_type: TypeQuota::all_direct(easy + medium + hard),
        }
    }

    #[test]
    fn test_empty_chunks() {
        assert!(distribute_across_chunks(&[], &requirements(2, 2, 2)).is_empty());
    }

    #[test]
    fn test_single_chunk_takes_everything() {
        let chunks = [chunk(1, 1000)];
        let result = distribute_across_chunks(&chunks, &requirements(3, 4, 5));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].difficulty, DifficultyQuota::new(3, 4, 5));
        assert_eq!(result[0].bloom.understand, 12);
        assert_eq!(result[0].question_type.direct, 12);
    }

    #[test]
    fn test_equal_chunks_split_evenly() {
        // {easy:6, medium:6, hard:6} over three equal chunks lands at 2 each,
        // and the last chunk reconciles the totals exactly.
        let chunks = [chunk(1, 1000), chunk(2, 1000), chunk(3, 1000)];
        let result = distribute_across_chunks(&chunks, &requirements(6, 6, 6));

        for quotas in &result {
            assert_eq!(quotas.difficulty, DifficultyQuota::new(2, 2, 2));
        }
        let easy_sum: u32 = result.iter().map(|q| q.difficulty.easy).sum();
        assert_eq!(easy_sum, 6);
    }

    #[test]
    fn test_last_chunk_absorbs_residual() {
        // Weights 0.45/0.45/0.10: easy=5 rounds to 2+2, the last chunk
        // absorbs the remaining 1 despite its small weight.
        let chunks = [chunk(1, 450), chunk(2, 450), chunk(3, 100)];
        let result = distribute_across_chunks(&chunks, &requirements(5, 0, 0));

        assert_eq!(result[0].difficulty.easy, 2);
        assert_eq!(result[1].difficulty.easy, 2);
        assert_eq!(result[2].difficulty.easy, 1);
    }

    #[test]
    fn test_over_rounding_clamps_last_chunk() {
        // Weights exactly 0.5/0.5/0.0: 3 × 0.5 rounds away from zero to 2
        // twice, so the last chunk's residual would be -1 and clamps to 0.
        let chunks = [chunk(1, 1), chunk(2, 1), chunk(3, 0)];
        let result = distribute_across_chunks(&chunks, &requirements(3, 0, 0));

        assert_eq!(result[0].difficulty.easy, 2);
        assert_eq!(result[1].difficulty.easy, 2);
        assert_eq!(result[2].difficulty.easy, 0);
    }

    #[test]
    fn test_axes_distributed_independently() {
        let chunks = [chunk(1, 300), chunk(2, 700)];
        let reqs = QuotaRequirements {
            difficulty: DifficultyQuota::new(10, 0, 0),
            bloom: BloomQuota {
                apply: 4,
                create: 2,
                ..BloomQuota::default()
            },
            question_type: TypeQuota {
                scenario_based: 7,
                ..TypeQuota::default()
            },
        };
        let result = distribute_across_chunks(&chunks, &reqs);

        let easy_sum: u32 = result.iter().map(|q| q.difficulty.easy).sum();
        let apply_sum: u32 = result.iter().map(|q| q.bloom.apply).sum();
        let create_sum: u32 = result.iter().map(|q| q.bloom.create).sum();
        let scenario_sum: u32 = result.iter().map(|q| q.question_type.scenario_based).sum();

        assert_eq!(easy_sum, 10);
        assert_eq!(apply_sum, 4);
        assert_eq!(create_sum, 2);
        assert_eq!(scenario_sum, 7);
    }

    #[test]
    fn test_zero_token_chunks_fall_back_to_equal_weights() {
        let chunks = [chunk(1, 0), chunk(2, 0)];
        let result = distribute_across_chunks(&chunks, &requirements(4, 0, 0));

        assert_eq!(result[0].difficulty.easy, 2);
        assert_eq!(result[1].difficulty.easy, 2);
    }

    proptest! {
        /// Every allocation is non-negative; totals reproduce exactly unless
        /// earlier chunks over-rounded, in which case the last chunk sits at
        /// the 0 clamp and the sum only overshoots.
        #[test]
        fn prop_axis_totals_reconcile(
            tokens in prop::collection::vec(1usize..5000, 1..8),
            easy in 0u32..50,
            medium in 0u32..50,
            hard in 0u32..50,
        ) {
            let chunks: Vec<Chunk> = tokens
                .iter()
                .enumerate()
                .map(|(i, &t)| chunk(i as u32 + 1, t))
                .collect();
            let reqs = requirements(easy, medium, hard);
            let result = distribute_across_chunks(&chunks, &reqs);

            prop_assert_eq!(result.len(), chunks.len());

            for (total, pick) in [
                (easy, 0usize),
                (medium, 1),
                (hard, 2),
            ] {
                let values: Vec<u32> =
                    result.iter().map(|q| q.difficulty.as_array()[pick]).collect();
                let sum: u32 = values.iter().sum();
                if sum != total {
                    // Only over-rounding can break exactness, and then the
                    // last chunk must have been clamped at zero.
                    prop_assert!(sum > total);
                    prop_assert_eq!(*values.last().unwrap(), 0);
                } else {
                    prop_assert_eq!(sum, total);
                }
            }
        }
    }
}
