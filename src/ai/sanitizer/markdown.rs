//! Markdown Stripping
//!
//! Question and answer text must read as plain prose. Backends frequently
//! decorate their output with markdown anyway, so field text goes through
//! a line-oriented stripper:
//!
//! - code fence lines removed, fenced content kept
//! - heading markers, blockquote markers, bullet and numbered-list prefixes
//! - horizontal rules
//! - images reduced to alt text, links reduced to link text
//! - paired bold/italic markers
//! - table pipes flattened to spaces
//! - whitespace collapsed

/// Strip markdown decoration from a text field, returning plain prose.
pub fn strip_markdown(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        // Fence and rule lines carry no content
        if trimmed.starts_with("```") || is_horizontal_rule(trimmed) {
            continue;
        }

        let stripped = strip_line_prefix(trimmed);
        let stripped = strip_inline(stripped);
        if !stripped.is_empty() {
            lines.push(stripped);
        }
    }

    collapse_whitespace(&lines.join(" "))
}

/// A rule line is three or more of the same marker character and nothing else.
fn is_horizontal_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && (compact.chars().all(|c| c == '-')
            || compact.chars().all(|c| c == '*')
            || compact.chars().all(|c| c == '_'))
}

/// Drop heading, blockquote, bullet, and numbered-list prefixes.
fn strip_line_prefix(line: &str) -> &str {
    let mut rest = line;

    // Blockquotes can nest
    while let Some(inner) = rest.strip_prefix('>') {
        rest = inner.trim_start();
    }

    // Headings: 1-6 hashes followed by whitespace
    let hashes = rest.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let after = &rest[hashes..];
        if after.starts_with(char::is_whitespace) {
            return after.trim_start();
        }
    }

    // Bullets
    for marker in ["- ", "* ", "+ "] {
        if let Some(inner) = rest.strip_prefix(marker) {
            return inner.trim_start();
        }
    }

    // Numbered lists: digits then ". " or ") "
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(inner) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            return inner.trim_start();
        }
    }

    rest
}

/// Strip inline decoration: images, links, emphasis markers, table pipes.
fn strip_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Image: ![alt](url) reduces to alt
            '!' if chars.get(i + 1) == Some(&'[') => {
                if let Some((text, next)) = bracket_link(&chars, i + 1) {
                    out.push_str(&text);
                    i = next;
                    continue;
                }
                out.push(chars[i]);
                i += 1;
            }
            // Link: [text](url) reduces to text
            '[' => {
                if let Some((text, next)) = bracket_link(&chars, i) {
                    out.push_str(&text);
                    i = next;
                    continue;
                }
                out.push(chars[i]);
                i += 1;
            }
            // Emphasis markers dropped only when a closing partner exists;
            // both markers go, the span between is stripped recursively
            '*' | '_' | '`' => {
                let marker = chars[i];
                let run = chars[i..].iter().take_while(|&&c| c == marker).count();
                let rest = &chars[i + run..];
                if let Some(end) = find_run(rest, marker, run) {
                    let inner: String = rest[..end + 1 - run].iter().collect();
                    out.push_str(&strip_inline(&inner));
                    i += run + end + 1;
                } else {
                    for _ in 0..run {
                        out.push(marker);
                    }
                    i += run;
                }
            }
            '|' => {
                out.push(' ');
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Parse `[text](url)` starting at the `[`. Returns (text, index past `)`).
fn bracket_link(chars: &[char], open: usize) -> Option<(String, usize)> {
    let close = chars[open + 1..].iter().position(|&c| c == ']')? + open + 1;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let paren_close = chars[close + 2..].iter().position(|&c| c == ')')? + close + 2;
    let text: String = chars[open + 1..close].iter().collect();
    Some((text, paren_close + 1))
}

/// Find a later run of at least `len` copies of `marker`.
fn find_run(chars: &[char], marker: char, len: usize) -> Option<usize> {
    let mut run = 0;
    for (i, &c) in chars.iter().enumerate() {
        if c == marker {
            run += 1;
            if run >= len {
                return Some(i);
            }
        } else {
            run = 0;
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(
            strip_markdown("What is the powerhouse of the cell?"),
            "What is the powerhouse of the cell?"
        );
    }

    #[test]
    fn test_heading_and_bullets() {
        let text = "## Answer\n- First point\n- Second point\n1. Third point";
        assert_eq!(
            strip_markdown(text),
            "Answer First point Second point Third point"
        );
    }

    #[test]
    fn test_bold_and_italic_pairs() {
        assert_eq!(
            strip_markdown("The **mitochondria** is the *powerhouse*."),
            "The mitochondria is the powerhouse."
        );
    }

    #[test]
    fn test_unpaired_marker_kept() {
        assert_eq!(strip_markdown("5 * 3 equals 15"), "5 * 3 equals 15");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            strip_markdown("See [the diagram](http://x/y.png) and ![cell wall](img.png)."),
            "See the diagram and cell wall."
        );
    }

    #[test]
    fn test_code_fences_and_inline_code() {
        let text = "```python\nprint('hi')\n```\nUse `print` to output.";
        assert_eq!(strip_markdown(text), "print('hi') Use print to output.");
    }

    #[test]
    fn test_blockquote_and_rule() {
        let text = "> Quoted claim\n---\nFollowing text";
        assert_eq!(strip_markdown(text), "Quoted claim Following text");
    }

    #[test]
    fn test_table_pipes_flattened() {
        let text = "| Phase | Event |\n| G1 | growth |";
        assert_eq!(strip_markdown(text), "Phase Event G1 growth");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            strip_markdown("Too   many\n\n\nspaces   here"),
            "Too many spaces here"
        );
    }
}
