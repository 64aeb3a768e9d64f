//! `mkconf nav` command implementation.

use std::path::PathBuf;

use clap::Args;
use mkconf_config::Config;
use mkconf_site::{NavNode, Site};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    /// Path to mkdocs.yml (default: search the current directory and its parents).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl NavArgs {
    /// Execute the nav command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let site = Site::load(&config)?;

        output.highlight(&site.site_name);
        output.info(&format!("docs_dir: {}", site.docs_dir.display()));
        if let Some(publisher) = &config.publisher {
            let parent = publisher.parent_page_id.as_deref().unwrap_or("space root");
            output.info(&format!("space: {} (under {parent})", publisher.space_key));
        }
        output.separator();

        let page_title = |title: &str| match &config.publisher {
            Some(publisher) => publisher.page_title(title),
            None => title.to_owned(),
        };
        for line in tree_lines(&site.nav, &page_title) {
            output.info(&line);
        }

        for warning in &site.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        Ok(())
    }
}

/// One line per nav node, indented two spaces per level.
fn tree_lines(nodes: &[NavNode], page_title: &dyn Fn(&str) -> String) -> Vec<String> {
    let mut lines = Vec::new();
    push_lines(nodes, page_title, 0, &mut lines);
    lines
}

fn push_lines(
    nodes: &[NavNode],
    page_title: &dyn Fn(&str) -> String,
    depth: usize,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            NavNode::Section { title, children } => {
                lines.push(format!("{indent}+ {}", page_title(title)));
                push_lines(children, page_title, depth + 1, lines);
            }
            NavNode::Page(page) => {
                lines.push(format!("{indent}- {} ({})", page_title(&page.title), page.src_path));
            }
            NavNode::Link { title, url } => {
                lines.push(format!("{indent}~ {title} -> {url} (not published)"));
            }
        }
    }
}
