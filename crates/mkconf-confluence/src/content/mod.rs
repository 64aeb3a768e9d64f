//! Page content pipeline.
//!
//! Turns a site page into a Confluence storage format body plus the files
//! that have to be attached to the page:
//!
//! 1. Strip HTML comments and dedent nested tables
//! 2. Render Markdown, resolving page links and claiming diagram blocks
//! 3. Render diagrams to PNG in a temporary directory
//! 4. Collect local images and diagrams as attachments, one per file name

mod anchors;
mod links;
mod preprocess;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mkconf_config::PublisherConfig;
use mkconf_diagrams::DiagramProcessor;
use mkconf_renderer::{ConfluenceBackend, MarkdownRenderer, basename};
use mkconf_site::Page;
use percent_encoding::percent_decode_str;
use tempfile::TempDir;
use ureq::Agent;

pub use anchors::{AnchorIndex, confluence_anchor, heading_anchors, mkdocs_anchor};
pub use links::PageLinkResolver;
pub use preprocess::{normalize_indented_tables, strip_html_comments};

use crate::error::PublishError;
use crate::page_map::PageMap;
use crate::tags::ConfluenceTagGenerator;
use links::resolve_src_path;

/// Rendering options shared by all pages.
#[derive(Debug, Clone, Default)]
pub struct ContentOptions {
    /// Kroki server; diagrams stay code blocks without it.
    pub kroki_url: Option<String>,
    /// Code macro language replacements.
    pub code_language_aliases: BTreeMap<String, String>,
    /// Prepend the `toc` macro.
    pub toc: bool,
    /// Drop the first H1, the page title already shows it.
    pub strip_title_heading: bool,
}

impl From<&PublisherConfig> for ContentOptions {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            kroki_url: config.kroki_url.clone(),
            code_language_aliases: config.code_language_aliases.clone(),
            toc: config.toc,
            strip_title_heading: config.strip_title_heading,
        }
    }
}

/// Everything a page needs to know about the rest of the site.
pub struct ContentContext<'a> {
    pub docs_dir: &'a Path,
    pub pages: Arc<PageMap>,
    pub anchors: Arc<AnchorIndex>,
    pub options: &'a ContentOptions,
    /// Agent used for Kroki requests.
    pub agent: &'a Agent,
}

/// A local file to attach to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttachment {
    /// Attachment name, as referenced by the page body.
    pub filename: String,
    pub path: PathBuf,
    pub content_type: String,
}

/// Rendered body and attachments of one page.
#[derive(Debug)]
pub struct PageContent {
    /// Storage format body.
    pub body: String,
    /// Files to upload, unique by file name.
    pub attachments: Vec<LocalAttachment>,
    /// Problems found while rendering, relative to this page.
    pub warnings: Vec<String>,
    /// Keeps rendered diagrams on disk until the attachments are uploaded.
    _diagrams: TempDir,
}

/// Render `page` into storage format and collect its attachments.
pub fn build_page_content(
    page: &Page,
    ctx: &ContentContext<'_>,
) -> Result<PageContent, PublishError> {
    let markdown = normalize_indented_tables(&strip_html_comments(&page.markdown));
    let diagrams_dir = TempDir::new()?;
    let options = ctx.options;

    let mut processor = DiagramProcessor::new(Arc::new(ConfluenceTagGenerator));
    if let Some(kroki_url) = &options.kroki_url {
        processor = processor.with_kroki(kroki_url, diagrams_dir.path(), ctx.agent.clone());
    }

    let resolver = PageLinkResolver::new(
        &page.src_path,
        Arc::clone(&ctx.pages),
        Arc::clone(&ctx.anchors),
    );

    let mut renderer = MarkdownRenderer::<ConfluenceBackend>::new()
        .with_toc(options.toc)
        .with_language_aliases(options.code_language_aliases.clone())
        .with_link_resolver(resolver)
        .with_processor(processor);
    if options.strip_title_heading {
        renderer = renderer.with_title_extraction();
    }

    let result = renderer.render_markdown(&markdown);
    let mut warnings = result.warnings;
    let mut collector = AttachmentCollector::default();

    for src in &result.images {
        let Some(path) = image_path(ctx.docs_dir, page.dir(), src) else {
            warnings.push(format!("image '{src}' is outside the docs directory"));
            continue;
        };
        if !path.is_file() {
            warnings.push(format!("image '{src}' not found at {}", path.display()));
            continue;
        }
        collector.add(basename(src).to_owned(), path, &mut warnings);
    }

    for (filename, path) in png_files(diagrams_dir.path())? {
        collector.add(filename, path, &mut warnings);
    }

    tracing::debug!(
        page = %page.src_path,
        attachments = collector.attachments.len(),
        warnings = warnings.len(),
        "Built page content"
    );

    Ok(PageContent {
        body: result.html,
        attachments: collector.attachments,
        warnings,
        _diagrams: diagrams_dir,
    })
}

#[derive(Default)]
struct AttachmentCollector {
    attachments: Vec<LocalAttachment>,
    seen: HashMap<String, PathBuf>,
}

impl AttachmentCollector {
    /// Add a file unless its name is taken; a different file under a taken
    /// name is reported and skipped.
    fn add(&mut self, filename: String, path: PathBuf, warnings: &mut Vec<String>) {
        if let Some(existing) = self.seen.get(&filename) {
            if *existing != path {
                warnings.push(format!(
                    "attachment name '{filename}' is used by {} and {}; keeping the first",
                    existing.display(),
                    path.display()
                ));
            }
            return;
        }
        self.seen.insert(filename.clone(), path.clone());
        self.attachments.push(LocalAttachment {
            content_type: content_type(&path),
            filename,
            path,
        });
    }
}

/// Filesystem path of an image referenced from a page in `page_dir`.
fn image_path(docs_dir: &Path, page_dir: &str, src: &str) -> Option<PathBuf> {
    let src = src.split(['?', '#']).next().unwrap_or_default();
    let src = percent_decode_str(src).decode_utf8_lossy();
    resolve_src_path(page_dir, &src).map(|relative| docs_dir.join(relative))
}

/// PNG files in `dir` as (file name, path), sorted by name.
fn png_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, PublishError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "png")
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            files.push((name.to_owned(), path));
        }
    }
    files.sort();
    Ok(files)
}

/// MIME type guessed from the file extension.
#[must_use]
pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}
