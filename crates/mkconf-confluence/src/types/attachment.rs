//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Serde ignores the fields that are not used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    pub id: String,
    /// Attachment file name.
    pub title: String,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    pub results: Vec<Attachment>,
}
