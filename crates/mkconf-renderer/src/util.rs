//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Convert a pulldown-cmark heading level to its number.
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Escape XML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Whether a link or image target points outside the docs tree.
///
/// Scheme-relative (`//host/..`) and `data:` URIs count as external.
#[must_use]
pub fn is_external_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("//") || lower.starts_with("data:") || lower.starts_with("mailto:") {
        return true;
    }
    lower.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Last path segment of an image or file reference, without query or fragment.
#[must_use]
pub fn basename(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_to_num() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<ac:image>"), "&lt;ac:image&gt;");
        assert_eq!(escape_html("Q&A"), "Q&amp;A");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_is_external_url() {
        assert!(is_external_url("https://example.com/a.png"));
        assert!(is_external_url("HTTP://EXAMPLE.COM"));
        assert!(is_external_url("ftp://files.example.com/x"));
        assert!(is_external_url("//cdn.example.com/x.png"));
        assert!(is_external_url("mailto:team@example.com"));
        assert!(is_external_url("data:image/png;base64,AAAA"));
        assert!(!is_external_url("images/logo.png"));
        assert!(!is_external_url("../guide.md#setup"));
        assert!(!is_external_url("/img/a.png"));
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("./images/diagram.png"), "diagram.png");
        assert_eq!(basename("logo.svg?v=2"), "logo.svg");
        assert_eq!(basename("a/b/c.png#frag"), "c.png");
        assert_eq!(basename("plain.png"), "plain.png");
    }
}
