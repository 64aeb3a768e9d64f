//! Publish and dry-run reports.

/// A page updated on Confluence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    pub title: String,
    pub url: String,
}

/// A page that could not be created, looked up or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Remote title of the page.
    pub title: String,
    pub error: String,
}

/// Outcome of [`Publisher::publish`](super::Publisher::publish).
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Titles of pages created while mirroring the hierarchy.
    pub created: Vec<String>,
    /// Titles of pages that already existed.
    pub reused: Vec<String>,
    pub updated: Vec<PublishedPage>,
    /// Titles of pages whose title and body were already up to date.
    pub unchanged: Vec<String>,
    pub attachments_uploaded: usize,
    pub failures: Vec<PageFailure>,
    pub warnings: Vec<String>,
}

impl PublishReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Attachments a page would receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAttachments {
    pub title: String,
    pub filenames: Vec<String>,
}

/// Outcome of [`Publisher::dry_run`](super::Publisher::dry_run).
#[derive(Debug, Default)]
pub struct DryRunReport {
    /// Titles of pages that do not exist yet.
    pub to_create: Vec<String>,
    /// Titles of pages that already exist.
    pub existing: Vec<String>,
    /// Titles of pages whose content would change.
    pub to_update: Vec<String>,
    pub unchanged: Vec<String>,
    pub attachments: Vec<PlannedAttachments>,
    pub failures: Vec<PageFailure>,
    pub warnings: Vec<String>,
}

impl DryRunReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of attachments that would be uploaded.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.iter().map(|a| a.filenames.len()).sum()
    }
}
