//! The seam between the publisher and Confluence.

use crate::error::ConfluenceError;
use crate::types::{Attachment, Page};

/// Confluence content operations used by the publisher.
///
/// [`ConfluenceClient`](crate::ConfluenceClient) talks to a real server;
/// `MockConfluence` keeps everything in memory for tests.
pub trait ConfluenceApi {
    /// First page titled `title` in `space_key`, with its version expanded.
    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError>;

    /// Create a page, under `parent_id` or at the space root.
    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// Get a page with the given fields expanded (e.g. `body.storage`).
    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError>;

    /// Replace title and body. `version` is the current version; the page
    /// is stored as `version + 1`.
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// Attachments of a page.
    fn get_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError>;

    /// Upload an attachment, replacing the data of one with the same name.
    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError>;

    /// Browser URL of a page.
    fn page_url(&self, page: &Page) -> String;
}
