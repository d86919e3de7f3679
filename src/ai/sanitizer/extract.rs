//! JSON Extraction
//!
//! Pulls the first JSON object out of a raw completion response. Backends
//! routinely wrap their JSON in markdown fences or surround it with prose,
//! so extraction runs before any parsing:
//!
//! 1. Strip markdown code fences (``` and ```json)
//! 2. Scan for the first brace-balanced object, string- and escape-aware
//! 3. Parse with serde_json

use serde_json::Value;

use crate::types::{ForgeError, Result};

/// Extract and parse the first JSON object from raw response text.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let stripped = strip_code_fences(raw);
    let candidate = first_balanced_object(&stripped)
        .ok_or_else(|| ForgeError::parse("no JSON object found in response"))?;

    serde_json::from_str(candidate)
        .map_err(|e| ForgeError::parse(format!("response JSON is malformed: {e}")))
}

/// Remove markdown code fence lines, keeping everything between them.
/// Handles ``` with or without a language tag.
pub fn strip_code_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }

    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find the first brace-balanced `{...}` span.
///
/// Tracks string state so braces inside string literals do not count, and
/// escape state so `\"` does not terminate a string.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
