//! Kroki client.
//!
//! Each diagram is POSTed as plain text to `{kroki_url}/{endpoint}/png`.
//! Requests run on the global rayon pool; one failing diagram never stops
//! the others from rendering.

use std::path::Path;
use std::time::Duration;

use rayon::prelude::*;
use ureq::Agent;

use crate::key::DiagramKey;
use crate::language::DiagramLanguage;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// A diagram waiting to be rendered.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    /// Code block index within the page.
    pub index: usize,
    pub source: String,
    pub language: DiagramLanguage,
}

/// A diagram written to the output directory as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub index: usize,
    /// File name inside the output directory, also used as attachment name.
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Failure to render one diagram.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {kind}")]
pub struct DiagramError {
    pub index: usize,
    pub kind: DiagramErrorKind,
}

impl DiagramError {
    fn new(index: usize, kind: DiagramErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Kind of diagram rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid PNG data")]
    InvalidPng,
}

/// Successful renders alongside the failures.
#[derive(Debug, Default)]
pub struct PartialRenderResult {
    pub rendered: Vec<RenderedDiagram>,
    pub errors: Vec<DiagramError>,
}

impl PartialRenderResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Create an HTTP agent shared by all Kroki requests.
///
/// Non-2xx statuses are returned as responses so the error body can be
/// reported.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Width and height from the PNG IHDR chunk, `None` if `data` is not a PNG.
pub(crate) fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[..8] != PNG_SIGNATURE {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

fn fetch_png(agent: &Agent, diagram: &DiagramRequest, kroki_url: &str) -> Result<Vec<u8>, DiagramError> {
    let url = format!("{kroki_url}/{}/png", diagram.language.kroki_endpoint());

    let response = agent
        .post(&url)
        .header("Content-Type", "text/plain")
        .send(diagram.source.as_bytes())
        .map_err(|e| DiagramError::new(diagram.index, DiagramErrorKind::Http(e.to_string())))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let detail = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError::new(
            diagram.index,
            DiagramErrorKind::Http(format!("HTTP {status}: {}", detail.trim())),
        ));
    }

    body.read_to_vec()
        .map_err(|e| DiagramError::new(diagram.index, DiagramErrorKind::Io(e.to_string())))
}

fn render_one(
    agent: &Agent,
    diagram: &DiagramRequest,
    kroki_url: &str,
    output_dir: &Path,
) -> Result<RenderedDiagram, DiagramError> {
    let data = fetch_png(agent, diagram, kroki_url)?;
    let (width, height) = png_dimensions(&data)
        .ok_or_else(|| DiagramError::new(diagram.index, DiagramErrorKind::InvalidPng))?;

    let filename = DiagramKey {
        source: &diagram.source,
        endpoint: diagram.language.kroki_endpoint(),
        format: "png",
    }
    .filename();

    std::fs::write(output_dir.join(&filename), &data)
        .map_err(|e| DiagramError::new(diagram.index, DiagramErrorKind::Io(e.to_string())))?;

    tracing::debug!(index = diagram.index, %filename, width, height, "Rendered diagram");

    Ok(RenderedDiagram {
        index: diagram.index,
        filename,
        width,
        height,
    })
}

/// Render diagrams to PNG files in `output_dir`, in parallel.
///
/// Identical diagrams map to the same file name, so rendering them twice
/// simply rewrites the same bytes.
#[must_use]
pub fn render_all(
    diagrams: &[DiagramRequest],
    kroki_url: &str,
    output_dir: &Path,
    agent: &Agent,
) -> PartialRenderResult {
    if diagrams.is_empty() {
        return PartialRenderResult::default();
    }

    let kroki_url = kroki_url.trim_end_matches('/');
    let (ok, err): (Vec<_>, Vec<_>) = diagrams
        .par_iter()
        .map(|d| render_one(agent, d, kroki_url, output_dir))
        .partition(Result::is_ok);

    PartialRenderResult {
        rendered: ok.into_iter().filter_map(Result::ok).collect(),
        errors: err.into_iter().filter_map(Result::err).collect(),
    }
}
