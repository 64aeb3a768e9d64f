//! Confluence markup for diagrams.

use mkconf_diagrams::{DiagramTagGenerator, RenderedDiagram};
use mkconf_renderer::{ConfluenceBackend, RenderBackend, escape_html};

/// Diagrams become image macros referencing the PNG attachment.
///
/// Failed diagrams keep their source in a code macro without a language
/// parameter, since the code macro rejects diagram languages.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConfluenceTagGenerator;

impl DiagramTagGenerator for ConfluenceTagGenerator {
    fn image_tag(&self, diagram: &RenderedDiagram) -> String {
        format!(
            r#"<ac:image ac:width="{}"><ri:attachment ri:filename="{}" /></ac:image>"#,
            diagram.width,
            escape_html(&diagram.filename)
        )
    }

    fn fallback(&self, _language: &str, source: &str) -> String {
        let mut out = String::new();
        ConfluenceBackend::code_block(None, source, &mut out);
        out
    }
}
