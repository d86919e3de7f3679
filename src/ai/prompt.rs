//! Prompt Construction
//!
//! Builds the fixed system instruction set and per-chunk generation prompts.
//! Prompts are backend-agnostic: the same text goes to every completion
//! backend, and per-axis quotas are spelled out with strict exact-count
//! language because generative backends drift without it.

use std::fmt::Write;

use crate::types::GenerationRequest;

/// Fixed system instructions sent with every generation call.
///
/// The response-side contract: a single JSON object with a "questions"
/// array, no prose, no markdown fencing. The sanitizer still tolerates
/// violations of all of this as the common case.
pub const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert exam question setter for higher education.

You generate exam questions from provided course material, following the requested counts per difficulty level, Bloom's taxonomy level, and question type EXACTLY.

Rules:
1. Base every question strictly on the provided material. Never invent facts.
2. Respond with ONE JSON object and nothing else: no prose before or after, no markdown code fences.
3. The JSON object must have exactly this shape:
{
  "questions": [
    {
      "question_text": "...",
      "answer_text": "...",
      "difficulty_level": "EASY" | "MEDIUM" | "HARD",
      "bloom_level": "REMEMBER" | "UNDERSTAND" | "APPLY" | "ANALYZE" | "EVALUATE" | "CREATE",
      "bloom_justification": "...",
      "question_type": "DIRECT" | "INDIRECT" | "SCENARIO_BASED" | "PROBLEM_BASED",
      "marks": "TWO" | "EIGHT" | "SIXTEEN",
      "unit_number": 1,
      "course_name": "...",
      "material_name": "..."
    }
  ]
}
4. Marks follow difficulty: EASY questions are worth TWO marks, MEDIUM are worth EIGHT, HARD are worth SIXTEEN.
5. Bloom levels follow difficulty: EASY uses REMEMBER or UNDERSTAND, MEDIUM uses APPLY or ANALYZE, HARD uses EVALUATE or CREATE.
6. Answers must be complete model answers a grader could mark against: at least 10 words for TWO marks, 25 words for EIGHT marks, 50 words for SIXTEEN marks.
7. Never output placeholder text such as "insert question here" or "lorem ipsum"."#;

/// Build the per-chunk generation prompt: chunk content, course/material/unit
/// labels, and every non-zero quota counter with exact-count language.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let total = request.total_questions();
    let mut prompt = String::with_capacity(request.content.len() + 1024);

    let _ = writeln!(prompt, "<TASK>");
    let _ = writeln!(
        prompt,
        "Generate EXACTLY {total} exam questions from the course material below."
    );
    let _ = writeln!(
        prompt,
        "Course: {} | Material: {} | Unit: {}",
        request.course_name, request.material_name, request.unit_number
    );
    let _ = writeln!(prompt, "</TASK>");
    prompt.push('\n');

    let _ = writeln!(prompt, "<REQUIRED_COUNTS>");
    let _ = writeln!(
        prompt,
        "These counts are hard requirements. Produce EXACTLY the number asked for in each category - no more, no fewer."
    );
    write_axis(&mut prompt, "Difficulty", &request.difficulty.counters());
    write_axis(&mut prompt, "Bloom level", &request.bloom.counters());
    write_axis(
        &mut prompt,
        "Question type",
        &request.question_type.counters(),
    );
    let _ = writeln!(prompt, "</REQUIRED_COUNTS>");
    prompt.push('\n');

    let _ = writeln!(prompt, "<MATERIAL>");
    prompt.push_str(&request.content);
    if !request.content.ends_with('\n') {
        prompt.push('\n');
    }
    let _ = writeln!(prompt, "</MATERIAL>");
    prompt.push('\n');

    let _ = writeln!(
        prompt,
        "Return the single JSON object now. No explanation, no markdown."
    );

    prompt
}

/// Write one axis's non-zero counters as requirement lines.
fn write_axis(prompt: &mut String, axis: &str, counters: &[(&'static str, u32)]) {
    for (label, count) in counters {
        if *count > 0 {
            let _ = writeln!(prompt, "- {axis} {label}: exactly {count} question(s)");
        }
    }
}
