//! Tolerant extraction of JSON embedded in free-form model output.
//!
//! Models routinely wrap their JSON in prose or markdown fences. This
//! scanner locates the first top-level JSON object or array and returns
//! the balanced slice, tracking string boundaries and escape sequences so
//! braces inside string values don't confuse the depth count.

/// Returns the first balanced JSON object or array in `raw`, or `None`
/// when no opening bracket exists. The slice is not guaranteed to parse;
/// callers still run it through serde.
pub fn extract_embedded_json(raw: &str) -> Option<&str> {
    let start = raw.find(['{', '['])?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in raw[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' | '[' if !in_string => {
                depth += 1;
            }
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&raw[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    // Unbalanced; return the tail and let the parser report the error.
    Some(&raw[start..])
}
