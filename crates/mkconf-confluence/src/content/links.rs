//! Links between published pages.

use std::sync::Arc;

use mkconf_renderer::{LinkResolver, PageLink, is_external_url};
use percent_encoding::percent_decode_str;

use super::anchors::AnchorIndex;
use crate::page_map::PageMap;

/// Resolves links found on one page against the published pages.
pub struct PageLinkResolver {
    src_path: String,
    pages: Arc<PageMap>,
    anchors: Arc<AnchorIndex>,
    warnings: Vec<String>,
}

impl PageLinkResolver {
    #[must_use]
    pub fn new(src_path: &str, pages: Arc<PageMap>, anchors: Arc<AnchorIndex>) -> Self {
        Self {
            src_path: src_path.to_owned(),
            pages,
            anchors,
            warnings: Vec::new(),
        }
    }

    fn current_dir(&self) -> &str {
        self.src_path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

impl LinkResolver for PageLinkResolver {
    fn resolve(&mut self, href: &str) -> Option<PageLink> {
        if is_external_url(href) || href.starts_with("ftp:") {
            return None;
        }

        let (path, anchor) = match href.split_once('#') {
            Some((path, anchor)) => (path, Some(decode(anchor)).filter(|a| !a.is_empty())),
            None => (href, None),
        };
        let path = path.split_once('?').map_or(path, |(p, _)| p);

        if path.is_empty() {
            let anchor = anchor?;
            return Some(PageLink::anchor(
                self.anchors.translate(&self.src_path, &anchor),
            ));
        }

        let path = decode(path);
        if !path.ends_with(".md") {
            return None;
        }

        let Some(resolved) = resolve_src_path(self.current_dir(), &path) else {
            self.warnings
                .push(format!("link '{href}' points outside the docs directory"));
            return None;
        };

        match self.pages.get(&resolved) {
            Some(remote) => {
                tracing::debug!(%href, target = %remote.title, "Resolved page link");
                let anchor = anchor.map(|a| self.anchors.translate(&resolved, &a));
                Some(PageLink::page(remote.title.clone(), anchor))
            }
            None => {
                self.warnings.push(format!(
                    "no Confluence page for link '{href}' (resolved to {resolved})"
                ));
                None
            }
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Resolve `target` against `current_dir`, both relative to `docs_dir`.
///
/// A leading `/` makes `target` relative to `docs_dir`. Returns `None` when
/// `..` leaves the docs directory.
pub(crate) fn resolve_src_path(current_dir: &str, target: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    let (base, rest) = match target.strip_prefix('/') {
        Some(rest) => ("", rest),
        None => (current_dir, target),
    };

    for segment in base.split('/').chain(rest.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}
