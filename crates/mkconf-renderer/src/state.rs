//! State structs tracked while walking markdown events.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// State for the code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    attrs: HashMap<String, String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block.
    pub fn start(&mut self, language: Option<String>, attrs: HashMap<String, String>) {
        self.active = true;
        self.language = language;
        self.attrs = attrs;
        self.buffer.clear();
    }

    /// End the current code block, returning (language, attrs, content).
    pub fn end(&mut self) -> (Option<String>, HashMap<String, String>, String) {
        self.active = false;
        (
            self.language.take(),
            std::mem::take(&mut self.attrs),
            std::mem::take(&mut self.buffer),
        )
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// State for table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Inline style for the current cell's alignment.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align: left;""#,
            Some(Alignment::Center) => r#" style="text-align: center;""#,
            Some(Alignment::Right) => r#" style="text-align: right;""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for an image whose alt text is being collected.
#[derive(Default)]
pub(crate) struct ImageState {
    /// Source and title of the open image.
    pending: Option<(String, String)>,
    alt_text: String,
}

impl ImageState {
    pub fn start(&mut self, src: String, title: String) {
        self.pending = Some((src, title));
        self.alt_text.clear();
    }

    /// End image capture, returning (src, alt, title).
    pub fn end(&mut self) -> Option<(String, String, String)> {
        let (src, title) = self.pending.take()?;
        Some((src, std::mem::take(&mut self.alt_text), title))
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Heading being rendered, and the first H1 dropped as the page title.
///
/// Confluence shows the page title above the body, so with title stripping
/// the first H1 is skipped and later headings move up one level.
#[derive(Default)]
pub(crate) struct HeadingState {
    strip_title: bool,
    title_dropped: bool,
    in_title: bool,
    current_level: Option<u8>,
    html: String,
    has_headings: bool,
}

impl HeadingState {
    pub fn new(strip_title: bool) -> Self {
        Self {
            strip_title,
            ..Self::default()
        }
    }

    /// Inside a heading that will be rendered.
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Inside the first H1 that is being dropped.
    pub fn is_in_title(&self) -> bool {
        self.in_title
    }

    /// Start a heading. Returns `false` when it is the dropped title.
    pub fn start_heading(&mut self, level: u8) -> bool {
        if self.strip_title && level == 1 && !self.title_dropped {
            self.in_title = true;
            return false;
        }
        self.current_level = Some(level);
        self.html.clear();
        true
    }

    pub fn end_title(&mut self) {
        self.in_title = false;
        self.title_dropped = true;
    }

    /// Finish the current heading, returning its output level and markup.
    pub fn complete_heading(&mut self) -> Option<(u8, String)> {
        let level = self.current_level.take()?;
        self.has_headings = true;
        let level = if self.title_dropped && level > 1 {
            level - 1
        } else {
            level
        };
        Some((level, std::mem::take(&mut self.html)))
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Whether any heading was rendered.
    pub fn has_headings(&self) -> bool {
        self.has_headings
    }
}
