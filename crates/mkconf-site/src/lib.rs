//! MkDocs site structure for mkconf.
//!
//! Builds the navigation tree of a MkDocs project either from the explicit
//! `nav` setting or, when absent, by walking `docs_dir` the way MkDocs does:
//!
//! - hidden entries and non-Markdown files are skipped
//! - `index.md` (or `README.md`) comes first in each directory, the rest is
//!   sorted by name
//! - every directory becomes a section, empty directories are dropped
//!
//! # Example
//!
//! ```ignore
//! use mkconf_config::Config;
//! use mkconf_site::Site;
//!
//! let config = Config::load(None, None)?;
//! let site = Site::load(&config)?;
//! for page in site.pages() {
//!     println!("{} -> {}", page.src_path, page.title);
//! }
//! ```

mod page;

use std::fs;
use std::path::{Path, PathBuf};

use mkconf_config::{Config, NavEntry};
use tracing::{debug, warn};

pub use page::{Page, first_h1, split_front_matter, title_from_name, title_from_path};

/// Error returned when the site cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The docs directory does not exist.
    #[error("Docs directory not found: {}", .0.display())]
    DocsDirNotFound(PathBuf),
    /// I/O error while walking the docs directory.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// A titled group of nodes.
    Section {
        /// Section title.
        title: String,
        /// Nested nodes.
        children: Vec<NavNode>,
    },
    /// A Markdown page.
    Page(Page),
    /// An external link (never published).
    Link {
        /// Link title.
        title: String,
        /// Target URL.
        url: String,
    },
}

impl NavNode {
    /// Title shown in navigation.
    pub fn title(&self) -> &str {
        match self {
            Self::Section { title, .. } | Self::Link { title, .. } => title,
            Self::Page(page) => &page.title,
        }
    }
}

/// The loaded site: navigation tree plus page sources.
#[derive(Debug, Clone)]
pub struct Site {
    /// `site_name` from `mkdocs.yml`.
    pub site_name: String,
    /// Absolute docs directory.
    pub docs_dir: PathBuf,
    /// Top-level navigation nodes.
    pub nav: Vec<NavNode>,
    /// Problems found while building the tree (missing files etc.).
    pub warnings: Vec<String>,
}

impl Site {
    /// Load the site described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the docs directory is missing or cannot be read.
    pub fn load(config: &Config) -> Result<Self, SiteError> {
        if !config.docs_dir.is_dir() {
            return Err(SiteError::DocsDirNotFound(config.docs_dir.clone()));
        }
        match &config.nav {
            Some(entries) => Ok(Self::from_nav(&config.site_name, &config.docs_dir, entries)),
            None => Self::discover(&config.site_name, &config.docs_dir),
        }
    }

    /// Build the tree from explicit nav entries.
    ///
    /// Entries pointing at missing files are skipped with a warning.
    pub fn from_nav(site_name: &str, docs_dir: &Path, entries: &[NavEntry]) -> Self {
        let mut warnings = Vec::new();
        let nav = build_from_entries(docs_dir, entries, &mut warnings);
        debug!(pages = count_pages(&nav), warnings = warnings.len(), "Built site from nav");
        Self {
            site_name: site_name.to_owned(),
            docs_dir: docs_dir.to_path_buf(),
            nav,
            warnings,
        }
    }

    /// Build the tree by walking `docs_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be listed.
    pub fn discover(site_name: &str, docs_dir: &Path) -> Result<Self, SiteError> {
        let mut warnings = Vec::new();
        let nav = scan_directory(docs_dir, "", &mut warnings)?;
        debug!(pages = count_pages(&nav), "Discovered site from docs directory");
        Ok(Self {
            site_name: site_name.to_owned(),
            docs_dir: docs_dir.to_path_buf(),
            nav,
            warnings,
        })
    }

    /// All pages in depth-first navigation order.
    pub fn pages(&self) -> Vec<&Page> {
        fn collect<'a>(nodes: &'a [NavNode], out: &mut Vec<&'a Page>) {
            for node in nodes {
                match node {
                    NavNode::Page(page) => out.push(page),
                    NavNode::Section { children, .. } => collect(children, out),
                    NavNode::Link { .. } => {}
                }
            }
        }
        let mut pages = Vec::new();
        collect(&self.nav, &mut pages);
        pages
    }

    /// Look up a page by its source path.
    pub fn page(&self, src_path: &str) -> Option<&Page> {
        self.pages().into_iter().find(|p| p.src_path == src_path)
    }
}

fn count_pages(nodes: &[NavNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            NavNode::Page(_) => 1,
            NavNode::Section { children, .. } => count_pages(children),
            NavNode::Link { .. } => 0,
        })
        .sum()
}

fn build_from_entries(
    docs_dir: &Path,
    entries: &[NavEntry],
    warnings: &mut Vec<String>,
) -> Vec<NavNode> {
    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            NavEntry::Page { title, path } => {
                match Page::read(docs_dir, path, title.as_deref()) {
                    Ok(page) => nodes.push(NavNode::Page(page)),
                    Err(e) => {
                        warn!(path = %path, error = %e, "Nav entry points at unreadable file, skipping");
                        warnings.push(format!("{path}: {e}"));
                    }
                }
            }
            NavEntry::Section { title, children } => nodes.push(NavNode::Section {
                title: title.clone(),
                children: build_from_entries(docs_dir, children, warnings),
            }),
            NavEntry::Link { title, url } => nodes.push(NavNode::Link {
                title: title.clone(),
                url: url.clone(),
            }),
        }
    }
    nodes
}

/// Walk one directory level of `root`, returning its nodes in nav order.
fn scan_directory(
    root: &Path,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Result<Vec<NavNode>, SiteError> {
    let dir = root.join(prefix);
    let entries = fs::read_dir(&dir).map_err(|source| SiteError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            dirs.push(name);
        } else if is_markdown(&name) {
            files.push(name);
        }
    }

    files.sort_by_key(|name| nav_order_key(name));
    dirs.sort();

    // Only one of index.md / README.md becomes the directory's index
    if files.iter().any(|f| stem_is(f, "index")) {
        files.retain(|f| !stem_is(f, "readme"));
    }

    let mut nodes = Vec::with_capacity(files.len() + dirs.len());
    for name in files {
        let src_path = join_src(prefix, &name);
        match Page::read(root, &src_path, None) {
            Ok(page) => nodes.push(NavNode::Page(page)),
            Err(e) => {
                warn!(path = %src_path, error = %e, "Failed to read page, skipping");
                warnings.push(format!("{src_path}: {e}"));
            }
        }
    }

    for name in dirs {
        let child_prefix = join_src(prefix, &name);
        let children = scan_directory(root, &child_prefix, warnings)?;
        if children.is_empty() {
            continue;
        }
        nodes.push(NavNode::Section {
            title: title_from_name(&name),
            children,
        });
    }
    Ok(nodes)
}

fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

fn stem_is(name: &str, stem: &str) -> bool {
    Path::new(name)
        .file_stem()
        .is_some_and(|s| s.to_string_lossy().eq_ignore_ascii_case(stem))
}

/// Index files sort first, everything else by name.
fn nav_order_key(name: &str) -> (bool, String) {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (!page::is_index_stem(&stem), name.to_owned())
}

fn join_src(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}
