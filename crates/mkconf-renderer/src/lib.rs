//! Markdown to Confluence storage format renderer.
//!
//! A generic [`MarkdownRenderer`] walks pulldown-cmark events and delegates
//! format-specific markup to a [`RenderBackend`]. [`ConfluenceBackend`]
//! produces the XHTML storage format accepted by the Confluence REST API.
//!
//! Shared functionality (tables, lists, inline formatting) is handled by the
//! generic renderer. Code blocks, blockquotes, images, headings and links to
//! other pages are delegated to the backend. Two hooks extend rendering:
//!
//! - [`CodeBlockProcessor`] claims fenced blocks (e.g. diagrams)
//! - [`LinkResolver`] turns hrefs into links to published pages
//!
//! # Example
//!
//! ```
//! use mkconf_renderer::{ConfluenceBackend, MarkdownRenderer};
//!
//! let result = MarkdownRenderer::<ConfluenceBackend>::new()
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n**Bold** text");
//! assert_eq!(result.html, "<p><strong>Bold</strong> text</p>");
//! ```

mod backend;
mod code_block;
mod confluence;
mod link;
mod renderer;
mod state;
mod util;

pub use backend::RenderBackend;
pub use code_block::{CodeBlockProcessor, ProcessResult};
pub use confluence::{ConfluenceBackend, TOC_MACRO};
pub use link::{LinkResolver, PageLink};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use util::{basename, escape_html, is_external_url};
