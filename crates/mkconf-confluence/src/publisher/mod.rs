//! Site publishing.
//!
//! Publishing runs in two phases:
//!
//! 1. [`Publisher::mirror_hierarchy`] finds or creates a page for every nav
//!    node, producing the [`PageMap`](crate::PageMap)
//! 2. [`Publisher::update_pages`] renders each page, updates it and uploads
//!    its attachments
//!
//! [`Publisher::dry_run`] performs the lookups and rendering of both phases
//! without changing anything.

mod hierarchy;
mod result;
mod update;

use std::time::Duration;

use mkconf_config::PublisherConfig;
use mkconf_diagrams::create_agent;
use mkconf_site::Site;
use tracing::info;
use ureq::Agent;

pub use hierarchy::SECTION_BODY;
pub use result::{DryRunReport, PageFailure, PlannedAttachments, PublishReport, PublishedPage};

use crate::api::ConfluenceApi;
use crate::content::ContentOptions;
use crate::error::{ConfluenceError, PublishError};

/// Timeout for a single Kroki request.
const KROKI_TIMEOUT: Duration = Duration::from_secs(30);

/// What to publish where.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub space_key: String,
    /// Page under which the hierarchy is mirrored (space root if `None`).
    pub parent_page_id: Option<String>,
    pub page_prefix: String,
    pub page_suffix: String,
    /// Version comment for updated pages.
    pub version_message: Option<String>,
    pub content: ContentOptions,
    pub kroki_timeout: Duration,
}

impl PublishOptions {
    /// Remote title of a page titled `title` locally.
    #[must_use]
    pub fn page_title(&self, title: &str) -> String {
        format!("{}{}{}", self.page_prefix, title, self.page_suffix)
    }
}

impl From<&PublisherConfig> for PublishOptions {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            space_key: config.space_key.clone(),
            parent_page_id: config.parent_page_id.clone(),
            page_prefix: config.page_prefix.clone(),
            page_suffix: config.page_suffix.clone(),
            version_message: config.version_message.clone(),
            content: ContentOptions::from(config),
            kroki_timeout: KROKI_TIMEOUT,
        }
    }
}

/// Publishes a site into a Confluence space.
pub struct Publisher<'a, C: ConfluenceApi + ?Sized> {
    api: &'a C,
    options: PublishOptions,
    agent: Agent,
}

impl<'a, C: ConfluenceApi + ?Sized> Publisher<'a, C> {
    #[must_use]
    pub fn new(api: &'a C, options: PublishOptions) -> Self {
        let agent = create_agent(options.kroki_timeout);
        Self {
            api,
            options,
            agent,
        }
    }

    #[must_use]
    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Mirror the hierarchy, then update all pages.
    ///
    /// Fails only when the configured parent page is unusable; per-page
    /// failures are collected in the report.
    pub fn publish(&self, site: &Site) -> Result<PublishReport, PublishError> {
        self.check_parent()?;
        info!(
            "Publishing {} page(s) to space {}",
            site.pages().len(),
            self.options.space_key
        );

        let mut report = PublishReport {
            warnings: site.warnings.clone(),
            ..PublishReport::default()
        };
        let map = self.mirror_hierarchy(site, &mut report);
        self.update_pages(site, &map, &mut report);

        info!(
            "Published: {} created, {} updated, {} unchanged, {} attachment(s), {} failure(s)",
            report.created.len(),
            report.updated.len(),
            report.unchanged.len(),
            report.attachments_uploaded,
            report.failures.len()
        );
        Ok(report)
    }

    /// Report what [`publish`](Self::publish) would do.
    pub fn dry_run(&self, site: &Site) -> Result<DryRunReport, PublishError> {
        self.check_parent()?;

        let mut report = DryRunReport {
            warnings: site.warnings.clone(),
            ..DryRunReport::default()
        };
        let map = self.plan_hierarchy(site, &mut report);
        self.plan_pages(site, &map, &mut report);
        Ok(report)
    }

    fn check_parent(&self) -> Result<(), PublishError> {
        let Some(parent_id) = &self.options.parent_page_id else {
            return Ok(());
        };
        match self.api.get_page(parent_id, &[]) {
            Ok(page) => {
                info!("Mirroring under '{}' (id {})", page.title, page.id);
                Ok(())
            }
            Err(ConfluenceError::HttpResponse { status: 404, .. }) => {
                Err(PublishError::ParentNotFound(parent_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockConfluence;

    fn site() -> (TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path();
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::create_dir_all(docs.join("img")).unwrap();
        fs::write(
            docs.join("index.md"),
            "# Home\n\nSee [setup](guide/setup.md#install-it).\n\n![logo](img/logo.png)\n",
        )
        .unwrap();
        fs::write(docs.join("img/logo.png"), b"\x89PNG").unwrap();
        fs::write(docs.join("guide/setup.md"), "# Setup\n\n## Install it\n").unwrap();
        fs::write(docs.join("guide/usage.md"), "# Usage\n\nBack [home](../index.md).\n").unwrap();

        let site = Site::discover("Docs", docs).unwrap();
        (dir, site)
    }

    fn options() -> PublishOptions {
        PublishOptions {
            space_key: "DOC".to_owned(),
            parent_page_id: None,
            page_prefix: String::new(),
            page_suffix: String::new(),
            version_message: Some("Published from MkDocs".to_owned()),
            content: ContentOptions::default(),
            kroki_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_publish_creates_hierarchy() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();

        let report = Publisher::new(&mock, options()).publish(&site).unwrap();

        assert_eq!(report.created, vec!["Home", "Guide", "Setup", "Usage"]);
        assert!(report.reused.is_empty());
        assert_eq!(report.updated.len(), 3);
        assert_eq!(report.attachments_uploaded, 1);
        assert!(!report.has_failures());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);

        let guide = mock.page_by_title("Guide").unwrap();
        assert_eq!(guide.body, SECTION_BODY);
        let setup = mock.page_by_title("Setup").unwrap();
        assert_eq!(setup.parent_id.as_deref(), Some(guide.id.as_str()));

        let home = mock.page_by_title("Home").unwrap();
        assert_eq!(home.parent_id, None);
        assert_eq!(home.version, 2);
        assert!(home.body.contains(
            r#"<ac:link ac:anchor="Install-it"><ri:page ri:content-title="Setup" />"#
        ));
        assert!(home.body.contains(r#"<ri:attachment ri:filename="logo.png" />"#));
        assert_eq!(mock.attachments(&home.id)[0].filename, "logo.png");
    }

    #[test]
    fn test_existing_pages_are_reused() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        let existing = mock.add_page("DOC", "Setup", None, "<p>old</p>");

        let report = Publisher::new(&mock, options()).publish(&site).unwrap();

        assert_eq!(report.reused, vec!["Setup"]);
        assert!(!mock.calls().contains(&"create:Setup".to_owned()));
        let setup = mock.page(&existing).unwrap();
        assert_eq!(setup.parent_id, None);
        assert_eq!(setup.version, 2);
    }

    #[test]
    fn test_failed_create_skips_subtree() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        mock.fail_create("Guide");

        let report = Publisher::new(&mock, options()).publish(&site).unwrap();

        assert_eq!(report.created, vec!["Home"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].title, "Guide");
        assert!(mock.page_by_title("Setup").is_none());
        // Setup and Usage have no remote page; Home links to Setup
        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings.iter().any(|w| w.starts_with("index.md: no Confluence page for link")));
    }

    #[test]
    fn test_failed_update_does_not_stop_later_pages() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        mock.fail_update("Home");

        let report = Publisher::new(&mock, options()).publish(&site).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].title, "Home");
        assert!(report.failures[0].error.contains("500"));
        let updated: Vec<_> = report.updated.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(updated, vec!["Setup", "Usage"]);
        // Attachments of a page whose update failed are not uploaded
        assert_eq!(report.attachments_uploaded, 0);
        assert_eq!(mock.page_by_title("Usage").unwrap().version, 2);
    }

    #[test]
    fn test_failed_upload_is_recorded() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        mock.fail_upload("logo.png");

        let report = Publisher::new(&mock, options()).publish(&site).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].title, "Home");
        assert_eq!(report.updated.len(), 3);
        assert_eq!(report.attachments_uploaded, 0);
        let home = mock.page_by_title("Home").unwrap();
        assert!(mock.attachments(&home.id).is_empty());
    }

    #[test]
    fn test_second_publish_is_unchanged() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        let publisher = Publisher::new(&mock, options());
        publisher.publish(&site).unwrap();
        mock.clear_calls();

        let report = publisher.publish(&site).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.reused.len(), 4);
        assert!(report.updated.is_empty());
        assert_eq!(report.unchanged, vec!["Home", "Setup", "Usage"]);
        assert!(!mock.calls().iter().any(|c| c.starts_with("update:")));
        // Attachments are upserted on every run
        assert_eq!(report.attachments_uploaded, 1);
    }

    #[test]
    fn test_prefix_and_suffix() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        let options = PublishOptions {
            page_prefix: "[Docs] ".to_owned(),
            page_suffix: " (v2)".to_owned(),
            ..options()
        };

        let report = Publisher::new(&mock, options).publish(&site).unwrap();

        assert_eq!(report.created[0], "[Docs] Home (v2)");
        let usage = mock.page_by_title("[Docs] Usage (v2)").unwrap();
        assert!(usage.body.contains(r#"ri:content-title="[Docs] Home (v2)""#));
    }

    #[test]
    fn test_parent_page() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        let root = mock.add_page("DOC", "Root", None, "");
        let options = PublishOptions {
            parent_page_id: Some(root.clone()),
            ..options()
        };

        Publisher::new(&mock, options).publish(&site).unwrap();

        let home = mock.page_by_title("Home").unwrap();
        assert_eq!(home.parent_id.as_deref(), Some(root.as_str()));
    }

    #[test]
    fn test_missing_parent_page() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        let options = PublishOptions {
            parent_page_id: Some("999".to_owned()),
            ..options()
        };

        let err = Publisher::new(&mock, options).publish(&site).unwrap_err();

        assert!(matches!(err, PublishError::ParentNotFound(id) if id == "999"));
        assert!(mock.pages().is_empty());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let (_dir, site) = site();
        let mock = MockConfluence::new();
        mock.add_page("DOC", "Usage", None, "");

        let report = Publisher::new(&mock, options()).dry_run(&site).unwrap();

        assert_eq!(report.to_create, vec!["Home", "Guide", "Setup"]);
        assert_eq!(report.existing, vec!["Usage"]);
        assert_eq!(report.to_update, vec!["Home", "Setup", "Usage"]);
        assert_eq!(report.attachment_count(), 1);
        assert_eq!(report.attachments[0].title, "Home");
        assert!(!report.has_failures());

        assert_eq!(mock.pages().len(), 1);
        assert!(
            mock.calls()
                .iter()
                .all(|c| c.starts_with("find:") || c.starts_with("get:"))
        );
    }
}
