//! `mkconf publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use mkconf_config::{CliSettings, Config};
use mkconf_confluence::publisher::PageFailure;
use mkconf_confluence::{
    ConfluenceApi, ConfluenceClient, DryRunReport, PublishOptions, PublishReport, Publisher,
};
use mkconf_site::Site;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to mkdocs.yml (default: search the current directory and its parents).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Look up and render pages without changing Confluence.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "KROKI_URL")]
    pub(crate) kroki_url: Option<String>,

    /// Target space key (overrides config).
    #[arg(long)]
    pub(crate) space_key: Option<String>,

    /// Page to mirror the navigation under (overrides config).
    #[arg(long)]
    pub(crate) parent_page_id: Option<String>,

    /// Page title prefix (overrides config).
    #[arg(long)]
    pub(crate) prefix: Option<String>,

    /// Page title suffix (overrides config).
    #[arg(long)]
    pub(crate) suffix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or site cannot be loaded, the
    /// parent page is missing, or any page failed to publish.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            kroki_url: self.kroki_url,
            space_key: self.space_key,
            parent_page_id: self.parent_page_id,
            page_prefix: self.prefix,
            page_suffix: self.suffix,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let publisher_config = config.require_publisher()?;

        if !publisher_config.is_enabled() {
            let var = publisher_config.enabled_if_env.as_deref().unwrap_or_default();
            output.warning(&format!(
                "Publishing to Confluence is disabled. Set {var}=true to enable it."
            ));
            return Ok(());
        }

        let connection = publisher_config.require_connection()?;
        let client = ConfluenceClient::from_connection(&connection);

        let site = Site::load(&config)?;
        output.info(&format!(
            "Publishing {} page(s) from {} to space {} at {}...",
            site.pages().len(),
            config.config_path.display(),
            publisher_config.space_key,
            client.base_url(),
        ));
        tracing::info!(site = %site.site_name, dry_run = self.dry_run, "Publishing site");

        run(&client, &site, PublishOptions::from(publisher_config), self.dry_run, &output)
    }
}

/// Publish or dry-run `site` and print the report.
///
/// Returns `CliError::PagesFailed` when any page could not be published.
fn run<C: ConfluenceApi + ?Sized>(
    api: &C,
    site: &Site,
    options: PublishOptions,
    dry_run: bool,
    output: &Output,
) -> Result<(), CliError> {
    let publisher = Publisher::new(api, options);
    let failures = if dry_run {
        let report = publisher.dry_run(site)?;
        print_dry_run_report(output, &report);
        report.failures.len()
    } else {
        let report = publisher.publish(site)?;
        print_publish_report(output, &report);
        report.failures.len()
    };

    if failures > 0 {
        return Err(CliError::PagesFailed(failures));
    }
    Ok(())
}

fn print_dry_run_report(output: &Output, report: &DryRunReport) {
    output.highlight("\n[DRY RUN] No changes made.");
    output.separator();

    output.list("Pages to create", &report.to_create);
    output.list("Existing pages", &report.existing);
    output.list("Pages to update", &report.to_update);
    output.list("Unchanged pages", &report.unchanged);

    if report.attachment_count() > 0 {
        output.info(&format!("\nAttachments ({}):", report.attachment_count()));
        for planned in &report.attachments {
            for filename in &planned.filenames {
                output.info(&format!("  {} -> {filename}", planned.title));
            }
        }
    }

    print_warnings(output, &report.warnings);
    print_failures(output, &report.failures);
}

fn print_publish_report(output: &Output, report: &PublishReport) {
    output.separator();

    output.list("Created pages", &report.created);
    if !report.updated.is_empty() {
        output.info(&format!("\nUpdated pages ({}):", report.updated.len()));
        for page in &report.updated {
            output.info(&format!("  - {} ({})", page.title, page.url));
        }
    }
    output.list("Unchanged pages", &report.unchanged);

    if report.attachments_uploaded > 0 {
        output.info(&format!(
            "\nAttachments uploaded: {}",
            report.attachments_uploaded
        ));
    }

    print_warnings(output, &report.warnings);
    print_failures(output, &report.failures);

    if !report.has_failures() {
        output.success(&format!(
            "\nPublished {} page(s).",
            report.updated.len() + report.unchanged.len()
        ));
    }
}

fn print_warnings(output: &Output, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    output.warning(&format!("\nWarnings ({}):", warnings.len()));
    for warning in warnings {
        output.info(&format!("  - {warning}"));
    }
}

fn print_failures(output: &Output, failures: &[PageFailure]) {
    if failures.is_empty() {
        return;
    }
    output.error(&format!("\nFailed pages ({}):", failures.len()));
    for failure in failures {
        output.info(&format!("  - {}: {}", failure.title, failure.error));
    }
}
