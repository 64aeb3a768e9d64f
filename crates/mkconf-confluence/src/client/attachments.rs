//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::{debug, info};

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

impl ConfluenceClient {
    /// Upload or update attachment (upsert by filename).
    pub(crate) fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        let existing = self
            .get_attachments(page_id)?
            .into_iter()
            .find(|a| a.title == filename);

        let url = if let Some(att) = &existing {
            info!("Updating attachment '{}' (id={})", filename, att.id);
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                page_id,
                att.id
            )
        } else {
            info!("Uploading attachment '{}' to page {}", filename, page_id);
            format!("{}/content/{}/child/attachment", self.api_url(), page_id)
        };

        let boundary = format!("----MkconfFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, filename, data, content_type, comment);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header())
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let mut reader = check_status(response)?;

        // A new upload answers with a result list, a data update with the attachment
        if existing.is_some() {
            Ok(reader.read_json()?)
        } else {
            let response: AttachmentsResponse = reader.read_json()?;
            response.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("empty attachment response".to_owned())
            })
        }
    }

    /// List attachments on a page.
    pub(crate) fn get_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        debug!("Getting attachments for page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .query("limit", "1000")
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/json")
            .call()?;

        let attachments: AttachmentsResponse = check_status(response)?.read_json()?;
        Ok(attachments.results)
    }
}

/// `multipart/form-data` body with a `file` part and an optional `comment`.
fn multipart_body(
    boundary: &str,
    filename: &str,
    data: &[u8],
    content_type: &str,
    comment: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename.replace('"', "%22")
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    if let Some(c) = comment {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
        body.extend_from_slice(c.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_multipart_body() {
        let body = multipart_body("B", "logo.png", b"PNG", "image/png", None);
        let expected = "--B\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
            Content-Type: image/png\r\n\r\n\
            PNG\r\n\
            --B--\r\n";
        assert_eq!(String::from_utf8(body).unwrap(), expected);
    }

    #[test]
    fn test_multipart_body_with_comment() {
        let body = multipart_body("B", "a.png", b"x", "image/png", Some("from mkdocs"));
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("name=\"comment\"\r\n\r\nfrom mkdocs\r\n"));
        assert!(text.ends_with("--B--\r\n"));
    }

    #[test]
    fn test_multipart_quotes_escaped() {
        let body = multipart_body("B", "a\"b.png", b"", "image/png", None);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("filename=\"a%22b.png\""));
    }
}
