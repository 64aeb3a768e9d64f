//! Error types for Confluence publishing.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error while publishing the site.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Confluence API call failed.
    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    /// Reading a local file or creating the diagram directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configured parent page does not exist.
    #[error("parent page {0} not found")]
    ParentNotFound(String),
}
