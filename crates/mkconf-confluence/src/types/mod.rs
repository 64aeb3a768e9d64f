//! Confluence REST API types.

mod attachment;
mod page;

pub use attachment::{Attachment, AttachmentsResponse};
pub use page::{Body, Links, Page, PageSearchResponse, Storage, Version};
