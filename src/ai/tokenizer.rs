//! Token Estimation
//!
//! Length-based token estimation for chunk budgeting.
//!
//! ## Strategy
//! - Pre-calculate token counts before sending to the completion backend
//! - Keep chunks roughly bounded by the per-chunk budget
//!
//! The estimate is a planning heuristic only: 4 characters ≈ 1 token,
//! rounded up. Real tokenizers diverge from this, so the value carries a
//! cost-control guarantee, never a correctness guarantee. Nothing downstream
//! may treat it as an exact count.

/// Estimate the token count of a text span (ceil of chars / 4).
///
/// Deterministic and pure; no error conditions.
#[inline]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_estimate_basic() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("hi"), 1); // 2 chars round up
        assert_eq!(estimate_tokens("hello"), 2); // 5 chars
        assert_eq!(estimate_tokens("hello world!"), 3); // 12 chars
    }

    #[test]
    fn test_estimate_counts_chars_not_bytes() {
        // 5 Hangul characters, 15 bytes
        assert_eq!(estimate_tokens("안녕하세요"), 2);
    }

    #[test]
    fn test_estimate_deterministic() {
        let text = "The mitochondria is the powerhouse of the cell.";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
    }

    proptest! {
        #[test]
        fn prop_estimate_bounds(text in ".*") {
            let chars = text.chars().count();
            let estimate = estimate_tokens(&text);
            // ceil(chars / 4) stays within one token of chars / 4
            prop_assert!(estimate * 4 >= chars);
            prop_assert!(estimate <= chars / 4 + 1);
        }
    }
}
