//! Local page to remote page mapping.

use std::collections::BTreeMap;

/// Remote counterpart of a local page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Confluence page id; empty in dry runs for pages not created yet.
    pub id: String,
    /// Title including prefix and suffix.
    pub title: String,
}

/// `src_path` to remote page.
pub type PageMap = BTreeMap<String, RemotePage>;
