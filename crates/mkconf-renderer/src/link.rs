//! Link resolution hook.
//!
//! The renderer itself knows nothing about the site. A [`LinkResolver`]
//! decides whether an href points at another published page; resolved links
//! are rendered through [`RenderBackend::page_link_start`](crate::RenderBackend::page_link_start),
//! everything else stays a plain link.

/// Target of a link to a published page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    /// Remote title of the target page; `None` links within the current page.
    pub title: Option<String>,
    /// Anchor on the target page, already in the target format.
    pub anchor: Option<String>,
}

impl PageLink {
    /// Link to another page.
    pub fn page(title: impl Into<String>, anchor: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            anchor,
        }
    }

    /// Link to an anchor on the current page.
    pub fn anchor(anchor: impl Into<String>) -> Self {
        Self {
            title: None,
            anchor: Some(anchor.into()),
        }
    }
}

/// Resolves link destinations found in Markdown.
pub trait LinkResolver {
    /// Resolve `href`. `None` keeps the link as a plain `<a href>`.
    fn resolve(&mut self, href: &str) -> Option<PageLink>;

    /// Problems found while resolving (e.g. links to unknown pages).
    fn warnings(&self) -> &[String] {
        &[]
    }
}
