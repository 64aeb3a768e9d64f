//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    pub id: String,
    /// Content type (always "page").
    #[serde(rename = "type", default = "page_type")]
    pub content_type: String,
    pub title: String,
    /// Present when expanded; search results without `expand=version` lack it.
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

fn page_type() -> String {
    "page".to_owned()
}

impl Page {
    /// Stored body in storage format, empty when not expanded.
    #[must_use]
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map_or("", |s| s.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Version {
    pub number: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    /// Web UI path relative to the base URL.
    #[serde(default)]
    pub webui: Option<String>,
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// Result of `GET /content` searches.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSearchResponse {
    pub results: Vec<Page>,
}
