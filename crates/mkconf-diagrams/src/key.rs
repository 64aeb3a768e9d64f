//! Content-addressed diagram naming.

use sha2::{Digest, Sha256};

/// Parameters that determine a rendered diagram's bytes.
#[derive(Debug)]
pub struct DiagramKey<'a> {
    /// Diagram source code.
    pub source: &'a str,
    /// Kroki endpoint (e.g., "plantuml", "mermaid").
    pub endpoint: &'a str,
    /// Output format ("png").
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// SHA-256 of `"{endpoint}:{format}:{source}"`, hex encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.endpoint.as_bytes());
        hasher.update(b":");
        hasher.update(self.format.as_bytes());
        hasher.update(b":");
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Attachment filename: `diagram_<first 12 hex chars>.<format>`.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("diagram_{}.{}", &self.compute_hash()[..12], self.format)
    }
}
