//! In-memory Confluence for tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, Body, Links, Page, Storage, Version};

/// A page stored by [`MockConfluence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    pub id: String,
    pub space_key: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub version: u32,
}

/// An attachment stored by [`MockConfluence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAttachment {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    /// Incremented on every upload of the same file name.
    pub version: u32,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    pages: Vec<MockPage>,
    attachments: BTreeMap<String, Vec<MockAttachment>>,
    failing_titles: HashSet<String>,
    failing_updates: HashSet<String>,
    failing_uploads: HashSet<String>,
    calls: Vec<String>,
}

impl MockState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        (1000 + self.next_id).to_string()
    }

    fn page_mut(&mut self, page_id: &str) -> Result<&mut MockPage, ConfluenceError> {
        self.pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| not_found(page_id))
    }
}

/// [`ConfluenceApi`] backed by memory.
///
/// Every call is recorded as `"<operation>:<argument>"` so tests can assert
/// on the exact sequence of remote operations.
#[derive(Debug, Default)]
pub struct MockConfluence {
    state: RefCell<MockState>,
}

impl MockConfluence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing page and return its id.
    pub fn add_page(
        &self,
        space_key: &str,
        title: &str,
        parent_id: Option<&str>,
        body: &str,
    ) -> String {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.pages.push(MockPage {
            id: id.clone(),
            space_key: space_key.to_owned(),
            title: title.to_owned(),
            parent_id: parent_id.map(str::to_owned),
            body: body.to_owned(),
            version: 1,
        });
        id
    }

    /// Make `create_page` fail for `title`.
    pub fn fail_create(&self, title: &str) {
        self.state.borrow_mut().failing_titles.insert(title.to_owned());
    }

    /// Make `update_page` fail for the page titled `title`.
    pub fn fail_update(&self, title: &str) {
        self.state.borrow_mut().failing_updates.insert(title.to_owned());
    }

    /// Make `upload_attachment` fail for `filename`.
    pub fn fail_upload(&self, filename: &str) {
        self.state.borrow_mut().failing_uploads.insert(filename.to_owned());
    }

    /// Recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    #[must_use]
    pub fn page(&self, page_id: &str) -> Option<MockPage> {
        self.state.borrow().pages.iter().find(|p| p.id == page_id).cloned()
    }

    #[must_use]
    pub fn page_by_title(&self, title: &str) -> Option<MockPage> {
        self.state.borrow().pages.iter().find(|p| p.title == title).cloned()
    }

    #[must_use]
    pub fn pages(&self) -> Vec<MockPage> {
        self.state.borrow().pages.clone()
    }

    #[must_use]
    pub fn attachments(&self, page_id: &str) -> Vec<MockAttachment> {
        self.state
            .borrow()
            .attachments
            .get(page_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn not_found(page_id: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("No content found with id: {page_id}"),
    }
}

fn to_page(page: &MockPage, with_body: bool) -> Page {
    Page {
        id: page.id.clone(),
        content_type: "page".to_owned(),
        title: page.title.clone(),
        version: Version {
            number: page.version,
            message: None,
        },
        body: with_body.then(|| Body {
            storage: Some(Storage {
                value: page.body.clone(),
                representation: "storage".to_owned(),
            }),
        }),
        links: Some(Links {
            webui: Some(format!("/pages/{}", page.id)),
            self_link: None,
        }),
    }
}

impl ConfluenceApi for MockConfluence {
    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        self.record(format!("find:{title}"));
        let state = self.state.borrow();
        Ok(state
            .pages
            .iter()
            .find(|p| p.space_key == space_key && p.title == title)
            .map(|p| to_page(p, false)))
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.record(format!("create:{title}"));
        let mut state = self.state.borrow_mut();

        if state.failing_titles.contains(title) {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: format!("cannot create '{title}'"),
            });
        }
        if state
            .pages
            .iter()
            .any(|p| p.space_key == space_key && p.title == title)
        {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: "A page with this title already exists".to_owned(),
            });
        }
        if let Some(parent_id) = parent_id {
            state.page_mut(parent_id)?;
        }

        let id = state.allocate_id();
        let page = MockPage {
            id,
            space_key: space_key.to_owned(),
            title: title.to_owned(),
            parent_id: parent_id.map(str::to_owned),
            body: body.to_owned(),
            version: 1,
        };
        let result = to_page(&page, true);
        state.pages.push(page);
        Ok(result)
    }

    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        self.record(format!("get:{page_id}"));
        let mut state = self.state.borrow_mut();
        let page = state.page_mut(page_id)?;
        Ok(to_page(page, expand.contains(&"body.storage")))
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        _message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.record(format!("update:{page_id}"));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| not_found(page_id))?;

        if state.failing_updates.contains(&page.title) {
            return Err(ConfluenceError::HttpResponse {
                status: 500,
                body: format!("cannot update '{}'", page.title),
            });
        }

        if page.version != version {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!("version {} is stale, page is at {}", version, page.version),
            });
        }

        page.title = title.to_owned();
        page.body = body.to_owned();
        page.version += 1;
        Ok(to_page(page, true))
    }

    fn get_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        self.record(format!("attachments:{page_id}"));
        let mut state = self.state.borrow_mut();
        state.page_mut(page_id)?;
        Ok(state
            .attachments
            .get(page_id)
            .into_iter()
            .flatten()
            .map(|a| Attachment {
                id: a.id.clone(),
                title: a.filename.clone(),
            })
            .collect())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
        _comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        self.record(format!("upload:{page_id}:{filename}"));
        let mut state = self.state.borrow_mut();
        state.page_mut(page_id)?;

        if state.failing_uploads.contains(filename) {
            return Err(ConfluenceError::HttpResponse {
                status: 413,
                body: format!("cannot upload '{filename}'"),
            });
        }

        let existing = state
            .attachments
            .get(page_id)
            .and_then(|list| list.iter().position(|a| a.filename == filename));

        let id = match existing {
            Some(pos) => {
                let list = state.attachments.entry(page_id.to_owned()).or_default();
                let attachment = &mut list[pos];
                attachment.data = data.to_vec();
                attachment.content_type = content_type.to_owned();
                attachment.version += 1;
                attachment.id.clone()
            }
            None => {
                let id = format!("att{}", state.allocate_id());
                state
                    .attachments
                    .entry(page_id.to_owned())
                    .or_default()
                    .push(MockAttachment {
                        id: id.clone(),
                        filename: filename.to_owned(),
                        content_type: content_type.to_owned(),
                        data: data.to_vec(),
                        version: 1,
                    });
                id
            }
        };

        Ok(Attachment {
            id,
            title: filename.to_owned(),
        })
    }

    fn page_url(&self, page: &Page) -> String {
        format!("https://confluence.test/pages/{}", page.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_and_find() {
        let mock = MockConfluence::new();
        let created = mock.create_page("DOC", "Home", "", None).unwrap();
        let found = mock.find_page_by_title("DOC", "Home").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(mock.find_page_by_title("OTHER", "Home").unwrap().is_none());
        assert_eq!(mock.calls(), vec!["create:Home", "find:Home", "find:Home"]);
    }

    #[test]
    fn test_update_checks_version() {
        let mock = MockConfluence::new();
        let id = mock.add_page("DOC", "Home", None, "<p>old</p>");

        let updated = mock.update_page(&id, "Home", "<p>new</p>", 1, None).unwrap();
        assert_eq!(updated.version.number, 2);

        let err = mock.update_page(&id, "Home", "<p>x</p>", 1, None).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 409, .. }));
        assert_eq!(mock.page(&id).unwrap().body, "<p>new</p>");
    }

    #[test]
    fn test_upload_upserts_by_filename() {
        let mock = MockConfluence::new();
        let id = mock.add_page("DOC", "Home", None, "");

        let first = mock.upload_attachment(&id, "a.png", b"1", "image/png", None).unwrap();
        let second = mock.upload_attachment(&id, "a.png", b"2", "image/png", None).unwrap();

        assert_eq!(first.id, second.id);
        let stored = mock.attachments(&id);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].data, b"2");
        assert_eq!(stored[0].version, 2);
    }

    #[test]
    fn test_failure_hooks() {
        let mock = MockConfluence::new();
        let id = mock.add_page("DOC", "Home", None, "<p>old</p>");
        mock.fail_update("Home");
        mock.fail_upload("big.png");

        let err = mock.update_page(&id, "Home", "<p>new</p>", 1, None).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 500, .. }));
        assert_eq!(mock.page(&id).unwrap().version, 1);

        let err = mock.upload_attachment(&id, "big.png", b"x", "image/png", None).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 413, .. }));
        assert!(mock.attachments(&id).is_empty());
        assert!(mock.upload_attachment(&id, "ok.png", b"x", "image/png", None).is_ok());
    }

    #[test]
    fn test_create_under_missing_parent() {
        let mock = MockConfluence::new();
        let err = mock.create_page("DOC", "Child", "", Some("999")).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 404, .. }));
    }
}
