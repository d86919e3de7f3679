//! Question Domain Model
//!
//! Core types for exam-question generation:
//!
//! - **Difficulty / BloomLevel / QuestionType / Marks**: classification enums
//!   with canonical SCREAMING_SNAKE_CASE wire forms and lenient parsing
//! - **Quota axes**: per-difficulty, per-Bloom, per-type integer counters
//! - **GenerationRequest**: one material + labels + the three quota axes
//! - **GeneratedQuestion**: the finished record handed to the caller
//!
//! Quota axes are independent: the sum of each axis is that axis's own
//! requested total, and nothing here forces the axes to agree with each
//! other. Keeping them consistent is the caller's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::error::{ForgeError, Result};

// =============================================================================
// Classification Enums
// =============================================================================

/// Question difficulty tier. Maps 1:1 onto default marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "EASY"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Hard => write!(f, "HARD"),
        }
    }
}

impl Difficulty {
    /// Lenient parse: trims and upper-cases before matching.
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EASY" => Some(Self::Easy),
            "MEDIUM" => Some(Self::Medium),
            "HARD" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// Bloom's taxonomy level: cognitive demand of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloomLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl fmt::Display for BloomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remember => write!(f, "REMEMBER"),
            Self::Understand => write!(f, "UNDERSTAND"),
            Self::Apply => write!(f, "APPLY"),
            Self::Analyze => write!(f, "ANALYZE"),
            Self::Evaluate => write!(f, "EVALUATE"),
            Self::Create => write!(f, "CREATE"),
        }
    }
}

impl BloomLevel {
    /// Lenient parse: trims and upper-cases before matching.
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REMEMBER" => Some(Self::Remember),
            "UNDERSTAND" => Some(Self::Understand),
            "APPLY" => Some(Self::Apply),
            "ANALYZE" => Some(Self::Analyze),
            "EVALUATE" => Some(Self::Evaluate),
            "CREATE" => Some(Self::Create),
            _ => None,
        }
    }

    /// Whether this level sits in the expected band for a difficulty:
    /// EASY covers Remember/Understand, MEDIUM covers Apply/Analyze,
    /// HARD covers Evaluate/Create.
    pub fn matches_difficulty(&self, difficulty: Difficulty) -> bool {
        match difficulty {
            Difficulty::Easy => matches!(self, Self::Remember | Self::Understand),
            Difficulty::Medium => matches!(self, Self::Apply | Self::Analyze),
            Difficulty::Hard => matches!(self, Self::Evaluate | Self::Create),
        }
    }
}

/// Question framing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Direct,
    Indirect,
    ScenarioBased,
    ProblemBased,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Indirect => write!(f, "INDIRECT"),
            Self::ScenarioBased => write!(f, "SCENARIO_BASED"),
            Self::ProblemBased => write!(f, "PROBLEM_BASED"),
        }
    }
}

impl QuestionType {
    /// Lenient parse: trims, upper-cases, and normalizes spaces/hyphens
    /// to underscores ("scenario based" and "SCENARIO-BASED" both match).
    pub fn from_loose(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "DIRECT" => Some(Self::Direct),
            "INDIRECT" => Some(Self::Indirect),
            "SCENARIO_BASED" => Some(Self::ScenarioBased),
            "PROBLEM_BASED" => Some(Self::ProblemBased),
            _ => None,
        }
    }
}

/// Marks awarded for a question. Defaults track difficulty 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Marks {
    Two,
    Eight,
    Sixteen,
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Two => write!(f, "TWO"),
            Self::Eight => write!(f, "EIGHT"),
            Self::Sixteen => write!(f, "SIXTEEN"),
        }
    }
}

impl Marks {
    /// Lenient parse accepting both word and digit forms.
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TWO" | "2" => Some(Self::Two),
            "EIGHT" | "8" => Some(Self::Eight),
            "SIXTEEN" | "16" => Some(Self::Sixteen),
            _ => None,
        }
    }

    /// Default marks for a difficulty: EASY→TWO, MEDIUM→EIGHT, HARD→SIXTEEN.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::Two,
            Difficulty::Medium => Self::Eight,
            Difficulty::Hard => Self::Sixteen,
        }
    }

    /// Numeric mark value.
    pub fn value(&self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// Minimum answer length in words expected at this mark level.
    pub fn min_answer_words(&self) -> usize {
        match self {
            Self::Two => 10,
            Self::Eight => 25,
            Self::Sixteen => 50,
        }
    }
}

// =============================================================================
// Quota Axes
// =============================================================================

/// Largest-remainder apportionment: shrink `counts` so they sum to exactly
/// `target` while preserving their proportions. Floors every share first,
/// then hands the leftover units to the largest fractional remainders
/// (ties go to the earlier counter). A zero counter never gains a unit.
fn apportion<const N: usize>(counts: [u32; N], target: u32) -> [u32; N] {
    let total: u32 = counts.iter().sum();
    if total == 0 || target == 0 {
        return [0; N];
    }

    let mut shares = [0u32; N];
    let mut remainders = [(0usize, 0u64); N];
    let mut allocated = 0u32;
    for i in 0..N {
        let exact = u64::from(counts[i]) * u64::from(target);
        shares[i] = (exact / u64::from(total)) as u32;
        allocated += shares[i];
        remainders[i] = (i, exact % u64::from(total));
    }

    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut leftover = target.saturating_sub(allocated);
    for (i, _) in remainders {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }

    shares
}

/// Rounded share of `axis_total` when `ask` of `requested` is in play.
fn proportional_target(axis_total: u32, ask: u32, requested: u32) -> u32 {
    let requested = u64::from(requested.max(1));
    let numerator = u64::from(axis_total) * u64::from(ask);
    ((numerator * 2 + requested) / (requested * 2)) as u32
}

/// Requested question counts per difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyQuota {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyQuota {
    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }

    /// Counters paired with their canonical labels, in fixed order.
    pub fn counters(&self) -> [(&'static str, u32); 3] {
        [
            ("EASY", self.easy),
            ("MEDIUM", self.medium),
            ("HARD", self.hard),
        ]
    }

    pub fn as_array(&self) -> [u32; 3] {
        [self.easy, self.medium, self.hard]
    }

    pub fn from_array(values: [u32; 3]) -> Self {
        Self {
            easy: values[0],
            medium: values[1],
            hard: values[2],
        }
    }

    /// Shrink the counters so they sum to exactly `target`, preserving
    /// their proportions by largest remainder.
    pub fn scaled_to(&self, target: u32) -> Self {
        Self::from_array(apportion(self.as_array(), target))
    }
}

/// Requested question counts per Bloom level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomQuota {
    pub remember: u32,
    pub understand: u32,
    pub apply: u32,
    pub analyze: u32,
    pub evaluate: u32,
    pub create: u32,
}

impl BloomQuota {
    pub fn total(&self) -> u32 {
        self.remember + self.understand + self.apply + self.analyze + self.evaluate + self.create
    }

    pub fn counters(&self) -> [(&'static str, u32); 6] {
        [
            ("REMEMBER", self.remember),
            ("UNDERSTAND", self.understand),
            ("APPLY", self.apply),
            ("ANALYZE", self.analyze),
            ("EVALUATE", self.evaluate),
            ("CREATE", self.create),
        ]
    }

    pub fn as_array(&self) -> [u32; 6] {
        [
            self.remember,
            self.understand,
            self.apply,
            self.analyze,
            self.evaluate,
            self.create,
        ]
    }

    pub fn from_array(values: [u32; 6]) -> Self {
        Self {
            remember: values[0],
            understand: values[1],
            apply: values[2],
            analyze: values[3],
            evaluate: values[4],
            create: values[5],
        }
    }

    /// Shrink the counters so they sum to exactly `target`, preserving
    /// their proportions by largest remainder.
    pub fn scaled_to(&self, target: u32) -> Self {
        Self::from_array(apportion(self.as_array(), target))
    }

    /// All of the requested total on UNDERSTAND (the normalization default).
    pub fn all_understand(total: u32) -> Self {
        Self {
            understand: total,
            ..Self::default()
        }
    }
}

/// Requested question counts per question type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeQuota {
    pub direct: u32,
    pub indirect: u32,
    pub scenario_based: u32,
    pub problem_based: u32,
}

impl TypeQuota {
    pub fn total(&self) -> u32 {
        self.direct + self.indirect + self.scenario_based + self.problem_based
    }

    pub fn counters(&self) -> [(&'static str, u32); 4] {
        [
            ("DIRECT", self.direct),
            ("INDIRECT", self.indirect),
            ("SCENARIO_BASED", self.scenario_based),
            ("PROBLEM_BASED", self.problem_based),
        ]
    }

    pub fn as_array(&self) -> [u32; 4] {
        [
            self.direct,
            self.indirect,
            self.scenario_based,
            self.problem_based,
        ]
    }

    pub fn from_array(values: [u32; 4]) -> Self {
        Self {
            direct: values[0],
            indirect: values[1],
            scenario_based: values[2],
            problem_based: values[3],
        }
    }

    /// Shrink the counters so they sum to exactly `target`, preserving
    /// their proportions by largest remainder.
    pub fn scaled_to(&self, target: u32) -> Self {
        Self::from_array(apportion(self.as_array(), target))
    }

    /// All of the requested total on DIRECT (the normalization default).
    pub fn all_direct(total: u32) -> Self {
        Self {
            direct: total,
            ..Self::default()
        }
    }
}

// =============================================================================
// Request / Result Records
// =============================================================================

/// One generation request: material text, labels, and the three quota axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content: String,
    pub course_name: String,
    pub material_name: String,
    pub unit_number: u32,
    pub difficulty: DifficultyQuota,
    pub bloom: BloomQuota,
    pub question_type: TypeQuota,
}

impl GenerationRequest {
    /// The requested total: the sum of the difficulty axis.
    pub fn total_questions(&self) -> u32 {
        self.difficulty.total()
    }

    /// Reject empty material and zero-count requests up front.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(ForgeError::invalid_input(
                "material content is empty or whitespace-only",
            ));
        }
        if self.total_questions() == 0 {
            return Err(ForgeError::invalid_input(
                "requested question count is zero (all difficulty counters are 0)",
            ));
        }
        Ok(())
    }

    /// Derive a per-chunk request: same labels, the chunk's content, and
    /// every axis shrunk to the chunk's share. The difficulty axis sums to
    /// exactly `ask`; the Bloom and type axes are apportioned to their own
    /// rounded share of `ask`, so a nonzero ask never collapses to an empty
    /// request.
    pub fn scaled_for_chunk(&self, content: impl Into<String>, ask: u32) -> Self {
        let requested = self.total_questions();
        let bloom_target = proportional_target(self.bloom.total(), ask, requested);
        let type_target = proportional_target(self.question_type.total(), ask, requested);
        Self {
            content: content.into(),
            course_name: self.course_name.clone(),
            material_name: self.material_name.clone(),
            unit_number: self.unit_number,
            difficulty: self.difficulty.scaled_to(ask.min(requested)),
            bloom: self.bloom.scaled_to(bloom_target),
            question_type: self.question_type.scaled_to(type_target),
        }
    }
}

/// A finished exam question, ready for the external persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub answer_text: String,
    pub difficulty_level: Difficulty,
    pub bloom_level: BloomLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_justification: Option<String>,
    pub question_type: QuestionType,
    pub marks: Marks,
    pub unit_number: u32,
    pub course_name: String,
    pub material_name: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_forms() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Easy).unwrap(),
            "\"EASY\""
        );
        assert_eq!(
            serde_json::to_string(&QuestionType::ScenarioBased).unwrap(),
            "\"SCENARIO_BASED\""
        );
        assert_eq!(serde_json::to_string(&Marks::Sixteen).unwrap(), "\"SIXTEEN\"");
        assert_eq!(
            serde_json::from_str::<BloomLevel>("\"EVALUATE\"").unwrap(),
            BloomLevel::Evaluate
        );
    }

    #[test]
    fn test_loose_parsing() {
        assert_eq!(Difficulty::from_loose(" easy "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_loose("IMPOSSIBLE"), None);
        assert_eq!(
            QuestionType::from_loose("scenario-based"),
            Some(QuestionType::ScenarioBased)
        );
        assert_eq!(
            QuestionType::from_loose("Problem Based"),
            Some(QuestionType::ProblemBased)
        );
        assert_eq!(Marks::from_loose("8"), Some(Marks::Eight));
        assert_eq!(Marks::from_loose("sixteen"), Some(Marks::Sixteen));
        assert_eq!(Marks::from_loose("4"), None);
        assert_eq!(BloomLevel::from_loose("create"), Some(BloomLevel::Create));
    }

    #[test]
    fn test_marks_defaults_track_difficulty() {
        assert_eq!(Marks::for_difficulty(Difficulty::Easy), Marks::Two);
        assert_eq!(Marks::for_difficulty(Difficulty::Medium), Marks::Eight);
        assert_eq!(Marks::for_difficulty(Difficulty::Hard), Marks::Sixteen);
    }

    #[test]
    fn test_marks_word_floors() {
        assert_eq!(Marks::Two.min_answer_words(), 10);
        assert_eq!(Marks::Eight.min_answer_words(), 25);
        assert_eq!(Marks::Sixteen.min_answer_words(), 50);
    }

    #[test]
    fn test_bloom_difficulty_bands() {
        assert!(BloomLevel::Remember.matches_difficulty(Difficulty::Easy));
        assert!(BloomLevel::Understand.matches_difficulty(Difficulty::Easy));
        assert!(BloomLevel::Apply.matches_difficulty(Difficulty::Medium));
        assert!(BloomLevel::Analyze.matches_difficulty(Difficulty::Medium));
        assert!(BloomLevel::Evaluate.matches_difficulty(Difficulty::Hard));
        assert!(BloomLevel::Create.matches_difficulty(Difficulty::Hard));

        assert!(!BloomLevel::Create.matches_difficulty(Difficulty::Easy));
        assert!(!BloomLevel::Remember.matches_difficulty(Difficulty::Hard));
    }

    #[test]
    fn test_quota_totals() {
        let quota = DifficultyQuota::new(2, 3, 4);
        assert_eq!(quota.total(), 9);

        let bloom = BloomQuota {
            remember: 1,
            understand: 2,
            apply: 3,
            ..BloomQuota::default()
        };
        assert_eq!(bloom.total(), 6);

        assert_eq!(TypeQuota::all_direct(7).total(), 7);
        assert_eq!(BloomQuota::all_understand(7).understand, 7);
    }

    #[test]
    fn test_quota_scaling_preserves_target_sum() {
        let quota = DifficultyQuota::new(6, 6, 6);
        assert_eq!(quota.scaled_to(6), DifficultyQuota::new(2, 2, 2));

        // Remainder ties break toward the earlier counter; the sum is
        // always exactly the target, never zero for a nonzero target.
        let quota = DifficultyQuota::new(1, 1, 1);
        assert_eq!(quota.scaled_to(1), DifficultyQuota::new(1, 0, 0));
        assert_eq!(quota.scaled_to(2), DifficultyQuota::new(1, 1, 0));

        // Target == total is the identity
        let quota = DifficultyQuota::new(3, 1, 2);
        assert_eq!(quota.scaled_to(6), quota);

        // Zero counters stay zero; zero targets and zero quotas yield zero
        let quota = DifficultyQuota::new(5, 0, 3);
        assert_eq!(quota.scaled_to(4).medium, 0);
        assert_eq!(quota.scaled_to(4).total(), 4);
        assert_eq!(quota.scaled_to(0).total(), 0);
        assert_eq!(DifficultyQuota::default().scaled_to(3).total(), 0);
    }

    #[test]
    fn test_quota_scaling_skews_toward_larger_counters() {
        let quota = DifficultyQuota::new(7, 2, 1);
        let scaled = quota.scaled_to(5);
        assert_eq!(scaled, DifficultyQuota::new(4, 1, 0));
        assert_eq!(scaled.total(), 5);
    }

    #[test]
    fn test_request_validation() {
        let mut request = GenerationRequest {
            content: "Cell division occurs in phases.".to_string(),
            course_name: "Biology".to_string(),
            material_name: "Unit 3 Notes".to_string(),
            unit_number: 3,
            difficulty: DifficultyQuota::new(2, 2, 2),
            bloom: BloomQuota::all_understand(6),
            question_type: TypeQuota::all_direct(6),
        };
        assert!(request.validate().is_ok());

        request.content = "   \n\t ".to_string();
        assert!(matches!(
            request.validate(),
            Err(ForgeError::InvalidInput(_))
        ));

        request.content = "Cell division.".to_string();
        request.difficulty = DifficultyQuota::default();
        assert!(matches!(
            request.validate(),
            Err(ForgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_scaled_for_chunk_keeps_labels() {
        let request = GenerationRequest {
            content: "full material".to_string(),
            course_name: "Physics".to_string(),
            material_name: "Optics".to_string(),
            unit_number: 2,
            difficulty: DifficultyQuota::new(6, 6, 6),
            bloom: BloomQuota::all_understand(18),
            question_type: TypeQuota::all_direct(18),
        };

        let chunk_request = request.scaled_for_chunk("chunk text", 6);
        assert_eq!(chunk_request.content, "chunk text");
        assert_eq!(chunk_request.course_name, "Physics");
        assert_eq!(chunk_request.unit_number, 2);
        assert_eq!(chunk_request.difficulty, DifficultyQuota::new(2, 2, 2));
        assert_eq!(chunk_request.bloom.understand, 6);
        assert_eq!(chunk_request.question_type.direct, 6);
    }

    #[test]
    fn test_scaled_for_chunk_small_ask_never_collapses() {
        let request = GenerationRequest {
            content: "full material".to_string(),
            course_name: "Biology".to_string(),
            material_name: "Unit 3 Notes".to_string(),
            unit_number: 3,
            difficulty: DifficultyQuota::new(1, 1, 1),
            bloom: BloomQuota::all_understand(3),
            question_type: TypeQuota::all_direct(3),
        };

        // A one-question share of a {1,1,1} request stays a one-question
        // request instead of rounding every counter to zero.
        let chunk_request = request.scaled_for_chunk("chunk", 1);
        assert_eq!(chunk_request.difficulty.total(), 1);
        assert_eq!(chunk_request.bloom.total(), 1);
        assert_eq!(chunk_request.question_type.total(), 1);
        assert_eq!(chunk_request.total_questions(), 1);
    }
}
