//! Mirroring the navigation tree as a page hierarchy.

use mkconf_site::{NavNode, Site};
use tracing::{debug, error, info};

use super::Publisher;
use super::result::{DryRunReport, PageFailure, PublishReport};
use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::page_map::{PageMap, RemotePage};

/// Body of pages created for nav sections: a list of their children.
pub const SECTION_BODY: &str = r#"<ac:structured-macro ac:name="children" />"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Section,
    Page,
}

impl<C: ConfluenceApi + ?Sized> Publisher<'_, C> {
    /// Find or create a remote page for every nav node, depth-first.
    ///
    /// Existing pages (same title in the space) are reused where they are.
    /// When a page cannot be created its subtree is skipped. Only pages end
    /// up in the returned map; sections serve as parents.
    pub fn mirror_hierarchy(&self, site: &Site, report: &mut PublishReport) -> PageMap {
        let space_key = &self.options.space_key;
        let created = &mut report.created;
        let reused = &mut report.reused;

        let mut ensure = |title: &str,
                          kind: NodeKind,
                          parent: Option<&str>|
         -> Result<String, ConfluenceError> {
            if let Some(existing) = self.api.find_page_by_title(space_key, title)? {
                debug!("Page '{}' exists with id {}", title, existing.id);
                reused.push(title.to_owned());
                return Ok(existing.id);
            }

            let body = match kind {
                NodeKind::Section => SECTION_BODY,
                NodeKind::Page => "",
            };
            let page = self.api.create_page(space_key, title, body, parent)?;
            info!("Created page '{}' (id {})", title, page.id);
            created.push(title.to_owned());
            Ok(page.id)
        };

        let mut map = PageMap::new();
        let root = self.options.parent_page_id.as_deref();
        self.walk(&site.nav, root, &mut map, &mut ensure, &mut report.failures);
        map
    }

    /// Look up every nav node without creating anything.
    ///
    /// Pages that do not exist yet are mapped with an empty id.
    pub(super) fn plan_hierarchy(&self, site: &Site, report: &mut DryRunReport) -> PageMap {
        let space_key = &self.options.space_key;
        let to_create = &mut report.to_create;
        let existing = &mut report.existing;

        let mut lookup = |title: &str,
                          _kind: NodeKind,
                          _parent: Option<&str>|
         -> Result<String, ConfluenceError> {
            match self.api.find_page_by_title(space_key, title)? {
                Some(page) => {
                    existing.push(title.to_owned());
                    Ok(page.id)
                }
                None => {
                    to_create.push(title.to_owned());
                    Ok(String::new())
                }
            }
        };

        let mut map = PageMap::new();
        let root = self.options.parent_page_id.as_deref();
        self.walk(&site.nav, root, &mut map, &mut lookup, &mut report.failures);
        map
    }

    fn walk<F>(
        &self,
        nodes: &[NavNode],
        parent: Option<&str>,
        map: &mut PageMap,
        resolve: &mut F,
        failures: &mut Vec<PageFailure>,
    ) where
        F: FnMut(&str, NodeKind, Option<&str>) -> Result<String, ConfluenceError>,
    {
        for node in nodes {
            let (kind, children) = match node {
                NavNode::Link { title, url } => {
                    debug!("Skipping nav link '{}' ({})", title, url);
                    continue;
                }
                NavNode::Section { children, .. } => (NodeKind::Section, children.as_slice()),
                NavNode::Page(_) => (NodeKind::Page, &[][..]),
            };

            let title = self.options.page_title(node.title());
            let id = match resolve(&title, kind, parent) {
                Ok(id) => id,
                Err(err) => {
                    error!("Failed to mirror page '{}': {}", title, err);
                    failures.push(PageFailure {
                        title,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            if let NavNode::Page(page) = node {
                debug!("Mapped {} to page {}", page.src_path, id);
                map.insert(
                    page.src_path.clone(),
                    RemotePage {
                        id: id.clone(),
                        title,
                    },
                );
            }

            if !children.is_empty() {
                self.walk(children, Some(&id), map, resolve, failures);
            }
        }
    }
}
