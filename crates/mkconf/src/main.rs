//! mkconf CLI - publish MkDocs sites to Confluence.
//!
//! Provides commands for:
//! - `publish`: Mirror the navigation tree into a Confluence space
//! - `nav`: Show the navigation tree with remote page titles

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{NavArgs, PublishArgs};
use output::Output;

/// mkconf - publish MkDocs sites to Confluence.
#[derive(Parser)]
#[command(name = "mkconf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the site to Confluence.
    Publish(PublishArgs),
    /// Print the navigation tree with remote page titles.
    Nav(NavArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Publish(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::Nav(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "mkconf",
            "publish",
            "-c",
            "site/mkdocs.yml",
            "--dry-run",
            "--space-key",
            "DOC",
            "--prefix",
            "[D] ",
            "-v",
        ])
        .unwrap();
        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert!(args.dry_run);
        assert!(args.verbose);
        assert_eq!(args.space_key.as_deref(), Some("DOC"));
        assert_eq!(args.prefix.as_deref(), Some("[D] "));
    }

    #[test]
    fn test_parse_nav() {
        let cli = Cli::try_parse_from(["mkconf", "nav"]).unwrap();
        assert!(matches!(cli.command, Commands::Nav(_)));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["mkconf", "serve"]).is_err());
    }
}
