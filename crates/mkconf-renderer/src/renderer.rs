//! Generic markdown renderer with pluggable backend.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::backend::RenderBackend;
use crate::code_block::{CodeBlockProcessor, ProcessResult, parse_fence_info};
use crate::link::{LinkResolver, PageLink};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState};
use crate::util::{escape_html, heading_level_to_num, is_external_url};

/// Result of rendering markdown.
#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    /// Rendered storage-format content.
    pub html: String,
    /// Sources of local images present in `html`, in document order, as written.
    pub images: Vec<String>,
    /// Warnings from processors and link resolution.
    pub warnings: Vec<String>,
}

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate format-specific rendering
/// while handling common elements (tables, lists, inline formatting) generically.
///
/// # Code Block Processors
///
/// Custom code block processing can be added via [`with_processor`](Self::with_processor).
/// Processors are checked in order; the first returning a non-`PassThrough` result wins.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// Open links; `Some` for links resolved to a page.
    link_stack: Vec<Option<PageLink>>,
    /// Inside a YAML metadata block (skipped).
    in_metadata: bool,
    images: Vec<String>,
    link_resolver: Option<Box<dyn LinkResolver>>,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    language_aliases: BTreeMap<String, String>,
    prepend_toc: bool,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            link_stack: Vec::new(),
            in_metadata: false,
            images: Vec::new(),
            link_resolver: None,
            processors: Vec::new(),
            code_block_index: 0,
            language_aliases: BTreeMap::new(),
            prepend_toc: false,
            _backend: PhantomData,
        }
    }

    /// Drop the first H1 (the page title) and move later headings up one level.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Prepend a table of contents when the page has headings.
    #[must_use]
    pub fn with_toc(mut self, enabled: bool) -> Self {
        self.prepend_toc = enabled;
        self
    }

    /// Replace code block languages before they reach the backend.
    ///
    /// Processors still see the language as written.
    #[must_use]
    pub fn with_language_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.language_aliases = aliases;
        self
    }

    /// Resolve links through `resolver`.
    #[must_use]
    pub fn with_link_resolver<R: LinkResolver + 'static>(mut self, resolver: R) -> Self {
        self.link_resolver = Some(Box::new(resolver));
        self
    }

    /// Add a code block processor.
    ///
    /// Processors are checked in order when a code block is encountered.
    /// The first processor returning a non-`PassThrough` result wins.
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Parser options used by [`render_markdown`](Self::render_markdown).
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
    }

    /// Parse and render markdown text.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        self.render(Parser::new_ext(markdown, Self::parser_options()))
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else if !self.heading.is_in_title() {
            self.output.push_str(content);
        }
    }

    /// Render markdown events and return the result.
    ///
    /// Registered processors get their `post_process` call before returning.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let mut html = std::mem::take(&mut self.output);
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }

        if self.prepend_toc && self.heading.has_headings() {
            let mut with_toc = String::with_capacity(html.len() + 64);
            B::toc(&mut with_toc);
            with_toc.push_str(&html);
            html = with_toc;
        }

        let mut warnings: Vec<String> = self
            .processors
            .iter()
            .flat_map(|p| p.warnings())
            .cloned()
            .collect();
        if let Some(resolver) = &self.link_resolver {
            warnings.extend(resolver.warnings().iter().cloned());
        }

        RenderResult {
            html,
            images: std::mem::take(&mut self.images),
            warnings,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the text is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let (lang, attrs) = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let (lang, attrs) = parse_fence_info(info);
                        ((!lang.is_empty()).then_some(lang), attrs)
                    }
                    _ => (None, Default::default()),
                };
                self.code.start(lang, attrs);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::MetadataBlock(_) => self.in_metadata = true,
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => self.link_start(&dest_url),
            Tag::Image {
                dest_url, title, ..
            } => {
                // Rendered in end_tag once the alt text is collected
                self.image.start(dest_url.to_string(), title.to_string());
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if self.heading.is_in_title() {
                    self.heading.end_title();
                } else if let Some((level, html)) = self.heading.complete_heading() {
                    B::heading(level, html.trim(), &mut self.output);
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => self.code_block_end(),
            TagEnd::List(ordered) => self
                .output
                .push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::MetadataBlock(_) => self.in_metadata = false,
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock => {}
            TagEnd::Image => {
                if let Some((src, alt, title)) = self.image.end() {
                    if self.heading.is_in_title() {
                        return;
                    }
                    if !is_external_url(&src) {
                        self.images.push(src.clone());
                    }
                    let mut tag = String::new();
                    B::image(&src, &alt, &title, &mut tag);
                    self.push_inline(&tag);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.link_end(),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn link_start(&mut self, href: &str) {
        let page_link = self
            .link_resolver
            .as_mut()
            .and_then(|resolver| resolver.resolve(href));
        let mut tag = String::new();
        match &page_link {
            Some(link) => B::page_link_start(link, &mut tag),
            None => B::link_start(href, &mut tag),
        }
        self.push_inline(&tag);
        self.link_stack.push(page_link);
    }

    fn link_end(&mut self) {
        let mut tag = String::new();
        match self.link_stack.pop().flatten() {
            Some(link) => B::page_link_end(&link, &mut tag),
            None => B::link_end(&mut tag),
        }
        self.push_inline(&tag);
    }

    fn code_block_end(&mut self) {
        let (lang, attrs, content) = self.code.end();
        let index = self.code_block_index;
        self.code_block_index += 1;

        if let Some(lang) = lang.as_deref() {
            for processor in &mut self.processors {
                match processor.process(lang, &attrs, &content, index) {
                    ProcessResult::Placeholder(text) | ProcessResult::Inline(text) => {
                        self.output.push_str(&text);
                        return;
                    }
                    ProcessResult::PassThrough => {}
                }
            }
        }

        let lang = lang.map(|l| self.language_aliases.get(&l).cloned().unwrap_or(l));
        B::code_block(lang.as_deref(), &content, &mut self.output);
    }

    fn text(&mut self, text: &str) {
        // Priority: metadata > code > image > inline text
        if self.in_metadata {
            return;
        }
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }
        if self.image.is_active() {
            self.image.push_str(text);
            return;
        }
        self.push_inline(&escape_html(text));
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn raw_html(&mut self, html: &str) {
        self.push_inline(html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.heading.is_active() || self.heading.is_in_title() {
            self.push_inline(" ");
        } else {
            self.output.push('\n');
        }
    }

    fn hard_break(&mut self) {
        let mut tag = String::new();
        B::hard_break(&mut tag);
        self.push_inline(&tag);
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ConfluenceBackend;
    use pretty_assertions::assert_eq;

    fn renderer() -> MarkdownRenderer<ConfluenceBackend> {
        MarkdownRenderer::new()
    }

    fn render(markdown: &str) -> RenderResult {
        renderer().render_markdown(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!").html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_without_title_extraction() {
        let result = render("# Title\n\n## Section");
        assert_eq!(result.html, "<h1>Title</h1><h2>Section</h2>");
    }

    #[test]
    fn test_title_extraction_shifts_levels() {
        let result = renderer()
            .with_title_extraction()
            .render_markdown("# My Title\n\nIntro\n\n## Section\n\n### Detail");
        assert_eq!(result.html, "<p>Intro</p><h1>Section</h1><h2>Detail</h2>");
    }

    #[test]
    fn test_title_with_inline_code_not_leaked() {
        let result = renderer()
            .with_title_extraction()
            .render_markdown("# Using `mkconf`\n\nBody");
        assert_eq!(result.html, "<p>Body</p>");
    }

    #[test]
    fn test_image_in_title_not_collected() {
        let result = renderer()
            .with_title_extraction()
            .render_markdown("# Title ![logo](logo.png)\n\nBody");
        assert_eq!(result.html, "<p>Body</p>");
        assert!(result.images.is_empty());
    }

    #[test]
    fn test_image_in_later_heading_collected() {
        let result = renderer()
            .with_title_extraction()
            .render_markdown("# Title\n\n## Logo ![logo](logo.png)");
        assert_eq!(result.images, vec!["logo.png".to_owned()]);
        assert!(result.html.starts_with("<h1>Logo <ac:image"));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");
        assert_eq!(result.html, "<h2>Install <code>npm</code></h2>");
    }

    #[test]
    fn test_heading_attributes_not_rendered() {
        let result = render("## Setup {#custom-id}");
        assert_eq!(result.html, "<h2>Setup</h2>");
    }

    #[test]
    fn test_metadata_block_skipped() {
        let result = render("---\ntitle: Hidden\n---\n\nVisible");
        assert_eq!(result.html, "<p>Visible</p>");
    }

    #[test]
    fn test_code_block_alias() {
        let aliases = BTreeMap::from([("json".to_owned(), "yaml".to_owned())]);
        let result = renderer()
            .with_language_aliases(aliases)
            .render_markdown("```json\n{\"a\": 1}\n```");
        assert!(result.html.contains(r#"ac:name="language">yaml<"#));
        assert!(result.html.contains(r#"<![CDATA[{"a": 1}"#));
    }

    #[test]
    fn test_code_block_without_language() {
        let result = render("```\nplain\n```");
        assert!(result.html.contains(r#"ac:name="code""#));
        assert!(!result.html.contains(r#"ac:name="language""#));
    }

    #[test]
    fn test_indented_code_block() {
        let result = render("    indented\n");
        assert!(result.html.contains("<![CDATA[indented\n]]>"));
    }

    #[test]
    fn test_blockquote_is_info_panel() {
        let result = render("> Note");
        assert_eq!(
            result.html,
            r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body><p>Note</p></ac:rich-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_images_recorded() {
        let result = render("![Logo](img/logo.png) ![Remote](https://example.com/x.png)");
        assert_eq!(result.images, vec!["img/logo.png".to_owned()]);
        assert!(result.html.contains(r#"<ri:attachment ri:filename="logo.png" />"#));
        assert!(result.html.contains(r#"<ri:url ri:value="https://example.com/x.png" />"#));
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            result.html,
            r#"<table><thead><tr><th style="text-align: left;">A</th><th style="text-align: right;">B</th></tr></thead><tbody><tr><td style="text-align: left;">1</td><td style="text-align: right;">2</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] todo\n- [x] done");
        assert_eq!(result.html, "<ul><li>[ ] todo</li><li>[x] done</li></ul>");
    }

    #[test]
    fn test_ordered_list_start() {
        let result = render("3. three\n4. four");
        assert!(result.html.starts_with(r#"<ol start="3">"#));
    }

    #[test]
    fn test_emphasis_and_strikethrough() {
        let result = render("*italic* **bold** ~~gone~~");
        assert_eq!(
            result.html,
            "<p><em>italic</em> <strong>bold</strong> <s>gone</s></p>"
        );
    }

    #[test]
    fn test_hard_break() {
        let result = render("line one  \nline two");
        assert_eq!(result.html, "<p>line one<br />line two</p>");
    }

    #[test]
    fn test_toc_prepended_when_enabled() {
        let result = renderer().with_toc(true).render_markdown("## A\n\ntext");
        assert!(result.html.starts_with(crate::TOC_MACRO));

        let result = renderer().with_toc(true).render_markdown("just text");
        assert_eq!(result.html, "<p>just text</p>");
    }

    #[test]
    fn test_unresolved_link_without_resolver() {
        let result = render("[Site](https://example.com?a=1&b=2)");
        assert_eq!(
            result.html,
            r#"<p><a href="https://example.com?a=1&amp;b=2">Site</a></p>"#
        );
    }

    struct TestResolver {
        warnings: Vec<String>,
    }

    impl LinkResolver for TestResolver {
        fn resolve(&mut self, href: &str) -> Option<PageLink> {
            match href {
                "install.md" => Some(PageLink::page("Docs - Install", None)),
                "#usage" => Some(PageLink::anchor("Usage")),
                "missing.md" => {
                    self.warnings.push("unknown page: missing.md".to_owned());
                    None
                }
                _ => None,
            }
        }

        fn warnings(&self) -> &[String] {
            &self.warnings
        }
    }

    #[test]
    fn test_resolved_links() {
        let result = renderer()
            .with_link_resolver(TestResolver {
                warnings: Vec::new(),
            })
            .render_markdown("See [the **install** guide](install.md), [usage](#usage) and [gone](missing.md).");
        assert_eq!(
            result.html,
            concat!(
                r#"<p>See <ac:link><ri:page ri:content-title="Docs - Install" /><ac:link-body>the <strong>install</strong> guide</ac:link-body></ac:link>, "#,
                r#"<ac:link ac:anchor="Usage"><ac:link-body>usage</ac:link-body></ac:link> and "#,
                r#"<a href="missing.md">gone</a>.</p>"#
            )
        );
        assert_eq!(result.warnings, vec!["unknown page: missing.md".to_owned()]);
    }

    #[test]
    fn test_link_in_heading() {
        let result = renderer()
            .with_link_resolver(TestResolver {
                warnings: Vec::new(),
            })
            .render_markdown("## See [install](install.md)");
        assert_eq!(
            result.html,
            r#"<h2>See <ac:link><ri:page ri:content-title="Docs - Install" /><ac:link-body>install</ac:link-body></ac:link></h2>"#
        );
    }

    // Code block processor tests

    struct PlaceholderProcessor {
        blocks: Vec<(usize, String)>,
    }

    impl CodeBlockProcessor for PlaceholderProcessor {
        fn process(
            &mut self,
            language: &str,
            attrs: &HashMap<String, String>,
            source: &str,
            index: usize,
        ) -> ProcessResult {
            if language == "diagram" {
                let format = attrs.get("format").map_or("svg", String::as_str);
                self.blocks.push((index, format!("{format}:{}", source.trim())));
                ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
            } else {
                ProcessResult::PassThrough
            }
        }

        fn post_process(&mut self, html: &mut String) {
            for (index, label) in &self.blocks {
                *html = html.replace(&format!("{{{{DIAGRAM_{index}}}}}"), &format!("[{label}]"));
            }
        }

        fn warnings(&self) -> &[String] {
            &[]
        }
    }

    struct InlineProcessor;

    impl CodeBlockProcessor for InlineProcessor {
        fn process(
            &mut self,
            language: &str,
            _attrs: &HashMap<String, String>,
            source: &str,
            _index: usize,
        ) -> ProcessResult {
            if language == "inline-test" {
                ProcessResult::Inline(format!("<div>{source}</div>"))
            } else {
                ProcessResult::PassThrough
            }
        }
    }

    #[test]
    fn test_processors_in_order() {
        let markdown =
            "```diagram format=png\nA -> B\n```\n\n```inline-test\nhello\n```\n\n```rust\nfn main() {}\n```";
        let mut renderer = renderer()
            .with_processor(PlaceholderProcessor { blocks: Vec::new() })
            .with_processor(InlineProcessor);
        let result = renderer.render_markdown(markdown);

        assert!(result.html.starts_with("[png:A -> B]<div>hello\n</div>"));
        assert!(result.html.contains(r#"ac:name="language">rust<"#));
    }

    #[test]
    fn test_processor_sees_unaliased_language() {
        let aliases = BTreeMap::from([("diagram".to_owned(), "text".to_owned())]);
        let result = renderer()
            .with_language_aliases(aliases)
            .with_processor(PlaceholderProcessor { blocks: Vec::new() })
            .render_markdown("```diagram\nA\n```");
        assert_eq!(result.html, "[svg:A]");
    }
}
