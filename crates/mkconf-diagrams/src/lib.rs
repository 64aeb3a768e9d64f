//! Diagram rendering for Confluence pages.
//!
//! Fenced blocks in a diagram language (`mermaid`, `plantuml`, `kroki-dot`,
//! ...) are claimed by [`DiagramProcessor`] while the page renders and turned
//! into PNG attachments by a Kroki server afterwards. Diagrams that cannot be
//! rendered stay on the page as code blocks.

mod key;
mod kroki;
mod language;
mod processor;
mod replace;

pub use key::DiagramKey;
pub use kroki::{
    DiagramError, DiagramErrorKind, DiagramRequest, PartialRenderResult, RenderedDiagram,
    create_agent, render_all,
};
pub use language::DiagramLanguage;
pub use processor::{DiagramProcessor, DiagramTagGenerator};
pub use replace::{placeholder, replace_placeholders};
