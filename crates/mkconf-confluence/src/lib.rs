//! Confluence publishing for mkconf.
//!
//! - [`ConfluenceClient`]: REST API client with Basic or Bearer authentication
//! - [`ConfluenceApi`]: the operations the publisher needs, implemented by the
//!   client and by an in-memory mock (`mock` feature)
//! - [`content`]: Markdown to storage format with links, images and diagrams
//! - [`Publisher`]: mirrors the nav tree and upserts every page
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mkconf_config::Config;
//! use mkconf_confluence::{ConfluenceClient, PublishOptions, Publisher};
//! use mkconf_site::Site;
//!
//! let config = Config::load(None, None)?;
//! let publisher_config = config.require_publisher()?;
//! let client = ConfluenceClient::from_connection(&publisher_config.require_connection()?);
//! let site = Site::load(&config)?;
//!
//! let report = Publisher::new(&client, PublishOptions::from(publisher_config)).publish(&site)?;
//! println!("{} page(s) updated", report.updated.len());
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod client;
pub mod content;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod page_map;
pub mod publisher;
mod tags;
pub mod types;

pub use api::ConfluenceApi;
pub use auth::Auth;
pub use client::ConfluenceClient;
pub use error::{ConfluenceError, PublishError};
pub use page_map::{PageMap, RemotePage};
pub use publisher::{DryRunReport, PublishOptions, PublishReport, Publisher};
