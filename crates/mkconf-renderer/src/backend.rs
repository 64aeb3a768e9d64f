//! Render backend trait for format-specific rendering.
//!
//! The renderer handles shared structure (paragraphs, lists, tables, inline
//! formatting) and delegates elements whose markup depends on the target
//! format to a backend.

use std::fmt::Write;

use crate::link::PageLink;
use crate::util::escape_html;

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// `lang` is the language after alias mapping.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    fn blockquote_start(out: &mut String);

    fn blockquote_end(out: &mut String);

    /// Render an image. `src` is the reference as written in the page.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a heading whose contents are already rendered to `html`.
    fn heading(level: u8, html: &str, out: &mut String) {
        write!(out, "<h{level}>{html}</h{level}>").unwrap();
    }

    /// Open a link that was not resolved to a page.
    fn link_start(href: &str, out: &mut String) {
        write!(out, r#"<a href="{}">"#, escape_html(href)).unwrap();
    }

    /// Close a link opened with [`link_start`](Self::link_start).
    fn link_end(out: &mut String) {
        out.push_str("</a>");
    }

    /// Open a link to another page of the site (or an anchor on this page).
    fn page_link_start(link: &PageLink, out: &mut String);

    /// Close a link opened with [`page_link_start`](Self::page_link_start).
    fn page_link_end(link: &PageLink, out: &mut String);

    /// Render a table of contents placeholder.
    fn toc(out: &mut String);

    fn hard_break(out: &mut String);

    fn horizontal_rule(out: &mut String);

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { "[x] " } else { "[ ] " });
    }
}
