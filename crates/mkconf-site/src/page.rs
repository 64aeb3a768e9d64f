//! Page sources and title resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());

static HEADING_ATTRS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{[^}]*\}\s*$").unwrap());

/// A Markdown page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Resolved page title (before prefix/suffix).
    pub title: String,
    /// Source path relative to `docs_dir`, forward slashes.
    pub src_path: String,
    /// Absolute path of the source file.
    pub abs_path: PathBuf,
    /// Markdown content with front matter stripped.
    pub markdown: String,
    /// `title` from front matter, if any.
    pub meta_title: Option<String>,
}

#[derive(Deserialize, Default)]
struct FrontMatter {
    title: Option<String>,
}

impl Page {
    /// Read a page from `docs_dir`.
    ///
    /// Title precedence: `nav_title`, front matter `title`, first H1, filename.
    pub(crate) fn read(
        docs_dir: &Path,
        src_path: &str,
        nav_title: Option<&str>,
    ) -> std::io::Result<Self> {
        let abs_path = docs_dir.join(src_path);
        let source = fs::read_to_string(&abs_path)?;
        let (front_matter, markdown) = split_front_matter(&source);

        let meta_title = front_matter
            .and_then(|yaml| serde_yaml::from_str::<FrontMatter>(yaml).ok())
            .and_then(|fm| fm.title)
            .filter(|t| !t.trim().is_empty());

        let title = nav_title
            .map(str::to_owned)
            .or_else(|| meta_title.clone())
            .or_else(|| first_h1(markdown))
            .unwrap_or_else(|| title_from_path(src_path));

        Ok(Self {
            title,
            src_path: src_path.to_owned(),
            abs_path,
            markdown: markdown.to_owned(),
            meta_title,
        })
    }

    /// Directory of the page relative to `docs_dir` (empty at the root).
    pub fn dir(&self) -> &str {
        self.src_path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// Split a leading YAML front matter block from Markdown.
///
/// Returns the YAML text (without delimiters) and the remaining Markdown.
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, source)
}

/// Text of the first level-one ATX heading.
pub fn first_h1(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = H1_RE.captures(line) {
            let text = HEADING_ATTRS_RE.replace(&caps[1], "");
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_owned());
            }
        }
    }
    None
}

/// Derive a title from a source path the way MkDocs does.
///
/// `index.md` at the root is "Home"; other index files (and `README.md`)
/// take their directory name.
pub fn title_from_path(src_path: &str) -> String {
    let mut parts = src_path.rsplit('/');
    let file = parts.next().unwrap_or_default();
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);

    if is_index_stem(stem) {
        return match parts.next() {
            Some(dir) => title_from_name(dir),
            None => "Home".to_owned(),
        };
    }
    title_from_name(stem)
}

/// Turn a file or directory name into a title.
///
/// `-` and `_` become spaces; an all-lowercase name gets its first letter
/// capitalized.
pub fn title_from_name(name: &str) -> String {
    let title = name.replace(['-', '_'], " ");
    let title = title.trim();
    if title.to_lowercase() != title {
        return title.to_owned();
    }
    let mut chars = title.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

pub(crate) fn is_index_stem(stem: &str) -> bool {
    stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_front_matter() {
        let (fm, body) = split_front_matter("---\ntitle: Setup\n---\n# Install\n");
        assert_eq!(fm, Some("title: Setup\n"));
        assert_eq!(body, "# Install\n");
    }

    #[test]
    fn test_split_front_matter_dots_terminator() {
        let (fm, body) = split_front_matter("---\ntitle: X\n...\nbody");
        assert_eq!(fm, Some("title: X\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_no_front_matter() {
        let (fm, body) = split_front_matter("# Title\n---\n");
        assert_eq!(fm, None);
        assert_eq!(body, "# Title\n---\n");
    }

    #[test]
    fn test_unterminated_front_matter_kept() {
        let (fm, body) = split_front_matter("---\ntitle: X\n");
        assert_eq!(fm, None);
        assert_eq!(body, "---\ntitle: X\n");
    }

    #[test]
    fn test_first_h1() {
        assert_eq!(first_h1("intro\n\n# Getting Started\n"), Some("Getting Started".to_owned()));
        assert_eq!(first_h1("## Sub\n"), None);
        assert_eq!(first_h1("# Closed #\n"), Some("Closed".to_owned()));
        assert_eq!(first_h1("# Using C#\n"), Some("Using C#".to_owned()));
        assert_eq!(first_h1("# Anchored {#custom}\n"), Some("Anchored".to_owned()));
    }

    #[test]
    fn test_first_h1_skips_code_fences() {
        let md = "```bash\n# not a heading\n```\n\n# Real\n";
        assert_eq!(first_h1(md), Some("Real".to_owned()));
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("index.md"), "Home");
        assert_eq!(title_from_path("getting-started.md"), "Getting started");
        assert_eq!(title_from_path("user_guide/index.md"), "User guide");
        assert_eq!(title_from_path("api/README.md"), "Api");
        assert_eq!(title_from_path("guide/FAQ.md"), "FAQ");
    }

    #[test]
    fn test_read_title_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.md"),
            "---\ntitle: From Meta\n---\n# From Heading\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.md"), "# From Heading\n").unwrap();
        fs::write(dir.path().join("c-page.md"), "text only\n").unwrap();

        let a = Page::read(dir.path(), "a.md", None).unwrap();
        assert_eq!(a.title, "From Meta");
        assert_eq!(a.meta_title.as_deref(), Some("From Meta"));
        assert_eq!(a.markdown, "# From Heading\n");

        let a_nav = Page::read(dir.path(), "a.md", Some("From Nav")).unwrap();
        assert_eq!(a_nav.title, "From Nav");

        assert_eq!(Page::read(dir.path(), "b.md", None).unwrap().title, "From Heading");
        assert_eq!(Page::read(dir.path(), "c-page.md", None).unwrap().title, "C page");
    }

    #[test]
    fn test_dir() {
        let page = Page {
            title: String::new(),
            src_path: "guide/setup/install.md".to_owned(),
            abs_path: PathBuf::new(),
            markdown: String::new(),
            meta_title: None,
        };
        assert_eq!(page.dir(), "guide/setup");
    }
}
