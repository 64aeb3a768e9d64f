//! Placeholder substitution.

use std::collections::HashMap;

const PREFIX: &str = "{{DIAGRAM_";
const SUFFIX: &str = "}}";

/// Placeholder emitted for the code block at `index`.
#[must_use]
pub fn placeholder(index: usize) -> String {
    format!("{PREFIX}{index}{SUFFIX}")
}

/// Replace every `{{DIAGRAM_n}}` that has an entry in `replacements`.
///
/// The input is scanned once. Placeholders without a replacement and
/// malformed ones are copied through unchanged.
#[must_use]
pub fn replace_placeholders(html: &str, replacements: &HashMap<usize, String>) -> String {
    if replacements.is_empty() {
        return html.to_owned();
    }

    let mut result = String::with_capacity(html.len());
    let mut remaining = html;

    while let Some(start) = remaining.find(PREFIX) {
        result.push_str(&remaining[..start]);
        let after = &remaining[start + PREFIX.len()..];

        let Some(end) = after.find(SUFFIX) else {
            result.push_str(&remaining[start..]);
            return result;
        };

        let consumed = start + PREFIX.len() + end + SUFFIX.len();
        match after[..end].parse::<usize>().ok().and_then(|i| replacements.get(&i)) {
            Some(replacement) => result.push_str(replacement),
            None => result.push_str(&remaining[start..consumed]),
        }
        remaining = &remaining[consumed..];
    }

    result.push_str(remaining);
    result
}
