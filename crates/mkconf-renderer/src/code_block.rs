//! Code block processor trait.
//!
//! Processors are registered with the renderer and consulted in order for
//! every fenced code block. The first one returning something other than
//! [`ProcessResult::PassThrough`] wins; unclaimed blocks become code macros.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use mkconf_renderer::{CodeBlockProcessor, ProcessResult};
//!
//! struct DiagramProcessor {
//!     pending: Vec<(usize, String)>,
//! }
//!
//! impl CodeBlockProcessor for DiagramProcessor {
//!     fn process(
//!         &mut self,
//!         language: &str,
//!         _attrs: &HashMap<String, String>,
//!         source: &str,
//!         index: usize,
//!     ) -> ProcessResult {
//!         if language == "mermaid" {
//!             self.pending.push((index, source.to_owned()));
//!             ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
//!         } else {
//!             ProcessResult::PassThrough
//!         }
//!     }
//!
//!     fn post_process(&mut self, html: &mut String) {
//!         for (index, source) in self.pending.drain(..) {
//!             let placeholder = format!("{{{{DIAGRAM_{index}}}}}");
//!             *html = html.replace(&placeholder, &format!("<pre>{source}</pre>"));
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the block with a placeholder, filled in by
    /// [`CodeBlockProcessor::post_process`] once rendering is done.
    Placeholder(String),

    /// Replace the block with markup immediately.
    Inline(String),

    /// Not handled, render as a regular code block.
    PassThrough,
}

/// Trait for processing special code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block.
    ///
    /// * `language` - Language identifier from the fence info string
    /// * `attrs` - `key=value` attributes from the fence
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based block index, unique within the document
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult;

    /// Replace placeholders in the rendered output.
    ///
    /// Called by the renderer after all events are processed.
    fn post_process(&mut self, _html: &mut String) {}

    /// Warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Parse a fence info string into language and attributes.
///
/// Accepts `lang key=value ...` as well as the attribute-list form
/// `{.lang key=value}` used by some MkDocs extensions.
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let info = info.trim();
    let info = info
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(info);

    let mut parts = info.split_whitespace();
    let language = parts
        .next()
        .map(|lang| lang.trim_start_matches('.'))
        .filter(|lang| !lang.contains('='))
        .unwrap_or_default()
        .to_owned();

    let mut attrs = HashMap::new();
    for part in info.split_whitespace().skip(usize::from(!language.is_empty())) {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}
