//! Heading anchor translation.
//!
//! MkDocs slugs headings (`Grafana (visualizations)` becomes
//! `grafana-visualizations`) while Confluence anchors keep the text with
//! whitespace replaced (`Grafana-(visualizations)`). Links written against
//! the MkDocs anchors are translated with the maps built here.

use std::collections::HashMap;
use std::sync::LazyLock;

use mkconf_site::Site;
use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());

static EXPLICIT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\{[^}]*#([\w-]+)[^}]*\}[ \t]*$").unwrap());

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static DASH_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Anchor MkDocs generates for a heading.
#[must_use]
pub fn mkdocs_anchor(text: &str) -> String {
    let lower = text.to_lowercase().replace(['(', ')'], "");
    let cleaned = NON_WORD_RE.replace_all(&lower, "");
    DASH_SPACE_RE
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_owned()
}

/// Anchor Confluence generates for a heading.
#[must_use]
pub fn confluence_anchor(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), "-").into_owned()
}

/// Map MkDocs anchors of every heading in `markdown` to Confluence anchors.
///
/// Explicit `{#id}` attributes are mapped as well. Headings inside fenced
/// code blocks are ignored.
#[must_use]
pub fn heading_anchors(markdown: &str) -> HashMap<String, String> {
    let mut anchors = HashMap::new();
    let mut fence: Option<&str> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }

        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };
        let raw = &caps[1];

        let (text, explicit_id) = match EXPLICIT_ID_RE.captures(raw) {
            Some(id_caps) => {
                let start = id_caps.get(0).map_or(raw.len(), |m| m.start());
                (&raw[..start], Some(id_caps[1].to_owned()))
            }
            None => (raw, None),
        };
        let text = text.replace('`', "");
        let target = confluence_anchor(&text);

        tracing::debug!(heading = %text, anchor = %target, "Mapped heading anchor");

        if let Some(id) = explicit_id {
            anchors.insert(id, target.clone());
        }
        anchors.insert(mkdocs_anchor(&text), target);
    }

    anchors
}

/// Anchor maps of all pages, keyed by `src_path`.
#[derive(Debug, Default, Clone)]
pub struct AnchorIndex {
    pages: HashMap<String, HashMap<String, String>>,
}

impl AnchorIndex {
    /// Build the index from every page of the site.
    #[must_use]
    pub fn build(site: &Site) -> Self {
        let mut index = Self::default();
        for page in site.pages() {
            index.insert(&page.src_path, heading_anchors(&page.markdown));
        }
        index
    }

    pub fn insert(&mut self, src_path: &str, anchors: HashMap<String, String>) {
        self.pages.insert(src_path.to_owned(), anchors);
    }

    /// Confluence anchor for `anchor` on the page at `src_path`.
    #[must_use]
    pub fn get(&self, src_path: &str, anchor: &str) -> Option<&str> {
        self.pages
            .get(src_path)
            .and_then(|anchors| anchors.get(anchor))
            .map(String::as_str)
    }

    /// `anchor` translated for the target page, unchanged when unknown.
    #[must_use]
    pub fn translate(&self, src_path: &str, anchor: &str) -> String {
        self.get(src_path, anchor).unwrap_or(anchor).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mkdocs_anchor() {
        assert_eq!(mkdocs_anchor("Grafana (visualizations)"), "grafana-visualizations");
        assert_eq!(mkdocs_anchor("What's new?"), "whats-new");
        assert_eq!(mkdocs_anchor("  A -- B  "), "a-b");
        assert_eq!(mkdocs_anchor("Über uns"), "über-uns");
    }

    #[test]
    fn test_confluence_anchor() {
        assert_eq!(confluence_anchor("Grafana (visualizations)"), "Grafana-(visualizations)");
        assert_eq!(confluence_anchor("a  \t b"), "a-b");
    }

    #[test]
    fn test_heading_anchors() {
        let md = "# Title\n\n## Grafana (visualizations)\n\ntext\n\n### Setup ###\n";
        let anchors = heading_anchors(md);
        assert_eq!(anchors.get("title").map(String::as_str), Some("Title"));
        assert_eq!(
            anchors.get("grafana-visualizations").map(String::as_str),
            Some("Grafana-(visualizations)")
        );
        assert_eq!(anchors.get("setup").map(String::as_str), Some("Setup"));
        assert_eq!(anchors.len(), 3);
    }

    #[test]
    fn test_explicit_id() {
        let anchors = heading_anchors("## Install the tool {#install}\n");
        assert_eq!(anchors.get("install").map(String::as_str), Some("Install-the-tool"));
        assert_eq!(
            anchors.get("install-the-tool").map(String::as_str),
            Some("Install-the-tool")
        );
    }

    #[test]
    fn test_ignores_code_fences_and_non_headings() {
        let md = "```bash\n# comment\n```\n#hashtag\n## Real\n";
        let anchors = heading_anchors(md);
        assert_eq!(anchors.len(), 1);
        assert!(anchors.contains_key("real"));
    }

    #[test]
    fn test_index_translate() {
        let mut index = AnchorIndex::default();
        index.insert("a.md", heading_anchors("## Q & A\n"));
        assert_eq!(index.translate("a.md", "q-a"), "Q-&-A");
        assert_eq!(index.translate("a.md", "missing"), "missing");
        assert_eq!(index.translate("b.md", "q-a"), "q-a");
    }
}
