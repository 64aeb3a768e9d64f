//! Code block processor for diagram fences.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use mkconf_renderer::{CodeBlockProcessor, ProcessResult};
use ureq::Agent;

use crate::kroki::{DiagramRequest, RenderedDiagram, render_all};
use crate::language::DiagramLanguage;
use crate::replace::{placeholder, replace_placeholders};

/// Produces the markup that replaces a diagram placeholder.
pub trait DiagramTagGenerator: Send + Sync {
    /// Markup referencing a rendered diagram file.
    fn image_tag(&self, diagram: &RenderedDiagram) -> String;

    /// Markup used when a diagram could not be rendered.
    fn fallback(&self, language: &str, source: &str) -> String;
}

struct PendingDiagram {
    index: usize,
    language: String,
    source: String,
}

struct KrokiTarget {
    url: String,
    output_dir: PathBuf,
    agent: Agent,
}

/// Claims diagram code blocks and renders them after the page is done.
///
/// Blocks are replaced by `{{DIAGRAM_n}}` placeholders during rendering.
/// [`CodeBlockProcessor::post_process`] renders them through Kroki and swaps
/// each placeholder for an image tag, or for the fallback markup when Kroki
/// is not configured or the render failed.
pub struct DiagramProcessor {
    kroki: Option<KrokiTarget>,
    tags: Arc<dyn DiagramTagGenerator>,
    pending: Vec<PendingDiagram>,
    warnings: Vec<String>,
}

impl DiagramProcessor {
    /// Processor without a Kroki server: every diagram falls back.
    pub fn new(tags: Arc<dyn DiagramTagGenerator>) -> Self {
        Self {
            kroki: None,
            tags,
            pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Render diagrams via `kroki_url`, writing PNG files to `output_dir`.
    #[must_use]
    pub fn with_kroki(
        mut self,
        kroki_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        agent: Agent,
    ) -> Self {
        self.kroki = Some(KrokiTarget {
            url: kroki_url.into(),
            output_dir: output_dir.into(),
            agent,
        });
        self
    }

    fn requests(&self) -> Vec<DiagramRequest> {
        self.pending
            .iter()
            .filter_map(|block| {
                DiagramLanguage::parse(&block.language).map(|language| DiagramRequest {
                    index: block.index,
                    source: block.source.clone(),
                    language,
                })
            })
            .collect()
    }
}

impl CodeBlockProcessor for DiagramProcessor {
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        if DiagramLanguage::parse(language).is_none() {
            return ProcessResult::PassThrough;
        }

        if let Some(format) = attrs.get("format").filter(|f| !f.eq_ignore_ascii_case("png")) {
            self.warnings.push(format!(
                "diagram {index}: format '{format}' is not supported, rendering as png"
            ));
        }

        self.pending.push(PendingDiagram {
            index,
            language: language.to_owned(),
            source: source.to_owned(),
        });
        ProcessResult::Placeholder(placeholder(index))
    }

    fn post_process(&mut self, html: &mut String) {
        if self.pending.is_empty() {
            return;
        }

        let mut replacements = HashMap::with_capacity(self.pending.len());

        if let Some(kroki) = &self.kroki {
            let result = render_all(&self.requests(), &kroki.url, &kroki.output_dir, &kroki.agent);
            for diagram in &result.rendered {
                replacements.insert(diagram.index, self.tags.image_tag(diagram));
            }
            for error in &result.errors {
                tracing::warn!(%error, "Diagram rendering failed");
                self.warnings.push(format!("{error}; kept as code block"));
            }
        } else {
            self.warnings.push(format!(
                "{} diagram(s) kept as code blocks: kroki_url is not configured",
                self.pending.len()
            ));
        }

        for block in &self.pending {
            replacements
                .entry(block.index)
                .or_insert_with(|| self.tags.fallback(&block.language, &block.source));
        }

        *html = replace_placeholders(html, &replacements);
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mkconf_renderer::{ConfluenceBackend, MarkdownRenderer};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::kroki::create_agent;

    struct TestTags;

    impl DiagramTagGenerator for TestTags {
        fn image_tag(&self, diagram: &RenderedDiagram) -> String {
            format!("<img {}>", diagram.filename)
        }

        fn fallback(&self, language: &str, source: &str) -> String {
            format!("<code {language}>{}</code>", source.trim_end())
        }
    }

    fn processor() -> DiagramProcessor {
        DiagramProcessor::new(Arc::new(TestTags))
    }

    #[test]
    fn test_non_diagram_passes_through() {
        let mut p = processor();
        let result = p.process("rust", &HashMap::new(), "fn main() {}", 0);
        assert_eq!(result, ProcessResult::PassThrough);
        assert!(p.pending.is_empty());
    }

    #[test]
    fn test_diagram_becomes_placeholder() {
        let mut p = processor();
        let result = p.process("kroki-plantuml", &HashMap::new(), "A -> B", 4);
        assert_eq!(result, ProcessResult::Placeholder("{{DIAGRAM_4}}".to_owned()));
        assert_eq!(p.pending.len(), 1);
        assert_eq!(p.pending[0].language, "kroki-plantuml");
        assert_eq!(p.pending[0].source, "A -> B");
    }

    #[test]
    fn test_svg_format_warns() {
        let mut p = processor();
        let attrs = HashMap::from([("format".to_owned(), "svg".to_owned())]);
        p.process("mermaid", &attrs, "graph TD", 0);
        assert_eq!(p.warnings().len(), 1);
        assert!(p.warnings()[0].contains("'svg'"));
    }

    #[test]
    fn test_without_kroki_falls_back() {
        let mut p = processor();
        p.process("mermaid", &HashMap::new(), "graph TD\n", 1);
        let mut html = "<p>x</p>{{DIAGRAM_1}}".to_owned();
        p.post_process(&mut html);

        assert_eq!(html, "<p>x</p><code mermaid>graph TD</code>");
        assert_eq!(p.warnings().len(), 1);
        assert!(p.warnings()[0].contains("kroki_url"));
    }

    #[test]
    fn test_failed_render_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = processor().with_kroki(
            "http://127.0.0.1:1",
            dir.path(),
            create_agent(Duration::from_secs(2)),
        );
        p.process("dot", &HashMap::new(), "digraph { a -> b }", 0);
        let mut html = "{{DIAGRAM_0}}".to_owned();
        p.post_process(&mut html);

        assert_eq!(html, "<code dot>digraph { a -> b }</code>");
        assert!(p.warnings()[0].starts_with("diagram 0: HTTP error"));
    }

    #[test]
    fn test_through_renderer() {
        let markdown = "Intro\n\n```mermaid\ngraph TD\n```\n\n```rust\nlet x = 1;\n```\n";
        let result = MarkdownRenderer::<ConfluenceBackend>::new()
            .with_processor(processor())
            .render_markdown(markdown);

        assert!(result.html.contains("<code mermaid>graph TD</code>"));
        assert!(!result.html.contains("{{DIAGRAM_"));
        assert!(result.html.contains(r#"<ac:parameter ac:name="language">rust</ac:parameter>"#));
        assert_eq!(result.warnings.len(), 1);
    }
}
