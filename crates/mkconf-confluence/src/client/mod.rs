//! Confluence REST API client.
//!
//! Sync HTTP client for the Confluence REST API (`{base_url}/rest/api`)
//! with Basic or Bearer authentication.

mod attachments;
mod pages;

use std::time::Duration;

use mkconf_config::ConnectionConfig;
use ureq::http::Response;
use ureq::{Agent, Body};

use crate::api::ConfluenceApi;
use crate::auth::Auth;
use crate::error::ConfluenceError;
use crate::types::{Attachment, Page};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: Auth,
}

impl ConfluenceClient {
    /// Create a client for `base_url` (without the `/rest/api` suffix).
    #[must_use]
    pub fn new(base_url: &str, auth: Auth) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
        }
    }

    /// Create a client from resolved connection settings.
    #[must_use]
    pub fn from_connection(connection: &ConnectionConfig) -> Self {
        Self::new(&connection.base_url, Auth::from_connection(connection))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    fn auth_header(&self) -> String {
        self.auth.header_value()
    }
}

/// Turn error statuses into [`ConfluenceError::HttpResponse`].
fn check_status(response: Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body)
}

impl ConfluenceApi for ConfluenceClient {
    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        self.find_page_by_title(space_key, title)
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.create_page(space_key, title, body, parent_id)
    }

    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        self.get_page(page_id, expand)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.update_page(page_id, title, body, version, message)
    }

    fn get_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        self.get_attachments(page_id)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        self.upload_attachment(page_id, filename, data, content_type, comment)
    }

    fn page_url(&self, page: &Page) -> String {
        self.page_url(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_url_trimmed() {
        let client = ConfluenceClient::new("https://wiki.example.com/", Auth::Bearer("t".to_owned()));
        assert_eq!(client.base_url(), "https://wiki.example.com");
        assert_eq!(client.api_url(), "https://wiki.example.com/rest/api");
    }

    #[test]
    fn test_from_connection_uses_basic_auth() {
        let client = ConfluenceClient::from_connection(&ConnectionConfig {
            base_url: "https://example.atlassian.net/wiki".to_owned(),
            username: Some("bob".to_owned()),
            api_token: "tok".to_owned(),
        });
        assert!(client.auth_header().starts_with("Basic "));
    }
}
