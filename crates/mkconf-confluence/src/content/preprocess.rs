//! Markdown clean-up before rendering.

use std::sync::LazyLock;

use regex::Regex;

static HTML_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Remove `<!-- ... -->` comments, including ones spanning several lines.
#[must_use]
pub fn strip_html_comments(markdown: &str) -> String {
    HTML_COMMENT_RE.replace_all(markdown, "").into_owned()
}

/// Remove the indentation of table lines.
///
/// Tables nested in list items do not survive the conversion to storage
/// format, so every line that starts and ends with `|` (ignoring
/// surrounding whitespace) is moved to column zero. Other lines are kept
/// verbatim.
#[must_use]
pub fn normalize_indented_tables(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(|line| {
            let stripped = line.trim_start();
            let trimmed = stripped.trim_end();
            if trimmed.len() > 1 && trimmed.starts_with('|') && trimmed.ends_with('|') {
                stripped
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_single_line_comment() {
        assert_eq!(strip_html_comments("a <!-- hidden --> b"), "a  b");
    }

    #[test]
    fn test_strip_multiline_comment() {
        let md = "Intro\n<!--\nTODO: rewrite\n-->\nOutro";
        assert_eq!(strip_html_comments(md), "Intro\n\nOutro");
    }

    #[test]
    fn test_strip_is_not_greedy() {
        assert_eq!(strip_html_comments("<!-- a -->keep<!-- b -->"), "keep");
    }

    #[test]
    fn test_normalize_indented_table() {
        let md = "- item\n\n    | A | B |\n    |---|---|\n    | 1 | 2 |\n\n    continued\n";
        let expected = "- item\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\n    continued\n";
        assert_eq!(normalize_indented_tables(md), expected);
    }

    #[test]
    fn test_normalize_keeps_other_lines() {
        let md = "  | not closed\n  text |\n  |";
        assert_eq!(normalize_indented_tables(md), md);
    }
}
