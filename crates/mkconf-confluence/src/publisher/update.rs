//! Page content upsert and attachment upload.

use std::sync::Arc;

use mkconf_site::{Page, Site};
use tracing::{debug, error, info};

use super::Publisher;
use super::result::{DryRunReport, PageFailure, PlannedAttachments, PublishReport, PublishedPage};
use crate::api::ConfluenceApi;
use crate::content::{AnchorIndex, ContentContext, PageContent, build_page_content};
use crate::error::PublishError;
use crate::page_map::{PageMap, RemotePage};

const EXPAND_CONTENT: &[&str] = &["body.storage", "version"];

impl<C: ConfluenceApi + ?Sized> Publisher<'_, C> {
    /// Render every mapped page, update it and upload its attachments.
    ///
    /// Pages are processed in nav order. A failing page is recorded in the
    /// report and does not stop the others.
    pub fn update_pages(&self, site: &Site, map: &PageMap, report: &mut PublishReport) {
        let ctx = self.content_context(site, map);

        for page in site.pages() {
            let Some(remote) = map.get(&page.src_path) else {
                report
                    .warnings
                    .push(format!("{}: no Confluence page, content not published", page.src_path));
                continue;
            };

            if let Err(err) = self.update_page(page, remote, &ctx, report) {
                error!("Failed to update page '{}': {}", remote.title, err);
                report.failures.push(PageFailure {
                    title: remote.title.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    fn update_page(
        &self,
        page: &Page,
        remote: &RemotePage,
        ctx: &ContentContext<'_>,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let content = build_page_content(page, ctx)?;
        collect_warnings(page, &content, &mut report.warnings);

        let current = self.api.get_page(&remote.id, EXPAND_CONTENT)?;
        if current.title == remote.title && current.storage_value() == content.body {
            debug!("Page '{}' is up to date", remote.title);
            report.unchanged.push(remote.title.clone());
        } else {
            let updated = self.api.update_page(
                &remote.id,
                &remote.title,
                &content.body,
                current.version.number,
                self.options.version_message.as_deref(),
            )?;
            info!(
                "Updated page '{}' to version {}",
                remote.title, updated.version.number
            );
            report.updated.push(PublishedPage {
                title: remote.title.clone(),
                url: self.api.page_url(&updated),
            });
        }

        for attachment in &content.attachments {
            let data = std::fs::read(&attachment.path)?;
            self.api.upload_attachment(
                &remote.id,
                &attachment.filename,
                &data,
                &attachment.content_type,
                None,
            )?;
            report.attachments_uploaded += 1;
        }

        Ok(())
    }

    /// Render every mapped page and compare it with the remote one.
    pub(super) fn plan_pages(&self, site: &Site, map: &PageMap, report: &mut DryRunReport) {
        let ctx = self.content_context(site, map);

        for page in site.pages() {
            let Some(remote) = map.get(&page.src_path) else {
                report
                    .warnings
                    .push(format!("{}: no Confluence page, content not published", page.src_path));
                continue;
            };

            if let Err(err) = self.plan_page(page, remote, &ctx, report) {
                error!("Failed to check page '{}': {}", remote.title, err);
                report.failures.push(PageFailure {
                    title: remote.title.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    fn plan_page(
        &self,
        page: &Page,
        remote: &RemotePage,
        ctx: &ContentContext<'_>,
        report: &mut DryRunReport,
    ) -> Result<(), PublishError> {
        let content = build_page_content(page, ctx)?;
        collect_warnings(page, &content, &mut report.warnings);

        let unchanged = if remote.id.is_empty() {
            false
        } else {
            let current = self.api.get_page(&remote.id, EXPAND_CONTENT)?;
            current.title == remote.title && current.storage_value() == content.body
        };

        if unchanged {
            report.unchanged.push(remote.title.clone());
        } else {
            report.to_update.push(remote.title.clone());
        }

        if !content.attachments.is_empty() {
            report.attachments.push(PlannedAttachments {
                title: remote.title.clone(),
                filenames: content
                    .attachments
                    .iter()
                    .map(|a| a.filename.clone())
                    .collect(),
            });
        }
        Ok(())
    }

    fn content_context<'s>(&'s self, site: &'s Site, map: &PageMap) -> ContentContext<'s> {
        ContentContext {
            docs_dir: &site.docs_dir,
            pages: Arc::new(map.clone()),
            anchors: Arc::new(AnchorIndex::build(site)),
            options: &self.options.content,
            agent: &self.agent,
        }
    }
}

fn collect_warnings(page: &Page, content: &PageContent, warnings: &mut Vec<String>) {
    warnings.extend(
        content
            .warnings
            .iter()
            .map(|w| format!("{}: {w}", page.src_path)),
    );
}
