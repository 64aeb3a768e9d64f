//! CLI error types.

use mkconf_config::ConfigError;
use mkconf_confluence::PublishError;
use mkconf_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Publishing finished but some pages could not be published.
    #[error("{0} page(s) failed")]
    PagesFailed(usize),
}
