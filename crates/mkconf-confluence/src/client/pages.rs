//! Page operations for Confluence API.

use serde_json::{Value, json};
use tracing::{debug, info};
use ureq::RequestBuilder;
use ureq::typestate::WithBody;

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::{Page, PageSearchResponse};

impl ConfluenceClient {
    /// Find a page by exact title within a space.
    pub(crate) fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        debug!("Looking up page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .query("spaceKey", space_key)
            .query("title", title)
            .query("type", "page")
            .query("expand", "version")
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/json")
            .call()?;

        let search: PageSearchResponse = check_status(response)?.read_json()?;
        Ok(search.results.into_iter().next())
    }

    /// Create a page, optionally as a child of `parent_id`.
    pub(crate) fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });
        if let Some(parent_id) = parent_id {
            payload["ancestors"] = json!([{"id": parent_id}]);
        }

        info!(
            "Creating page '{}' in space {} (parent: {})",
            title,
            space_key,
            parent_id.unwrap_or("space root")
        );

        let page: Page = self.send_json(self.agent.post(&url), &payload)?;
        info!("Created page '{}' with id {}", title, page.id);
        Ok(page)
    }

    /// Get page by ID with optional field expansion.
    pub(crate) fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        debug!("Getting page {}", page_id);

        let mut request = self.agent.get(&url);
        if !expand.is_empty() {
            request = request.query("expand", expand.join(","));
        }

        let response = request
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/json")
            .call()?;

        Ok(check_status(response)?.read_json()?)
    }

    /// Update existing page (auto-increments version).
    pub(crate) fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        let mut payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version + 1}
        });
        if let Some(msg) = message {
            payload["version"]["message"] = json!(msg);
        }

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        self.send_json(self.agent.put(&url), &payload)
    }

    /// Web UI URL of a page.
    pub(crate) fn page_url(&self, page: &Page) -> String {
        match page.links.as_ref().and_then(|l| l.webui.as_deref()) {
            Some(webui) => format!("{}{}", self.base_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }

    fn send_json(
        &self,
        request: RequestBuilder<WithBody>,
        payload: &Value,
    ) -> Result<Page, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;

        let response = request
            .header("Authorization", &self.auth_header())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        Ok(check_status(response)?.read_json()?)
    }
}
