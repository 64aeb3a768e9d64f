//! Configuration management for mkconf.
//!
//! Reads the MkDocs project file (`mkdocs.yml`) and the options of the
//! `confluence-publisher` plugin block inside it:
//!
//! ```yaml
//! site_name: Team Handbook
//! docs_dir: docs
//! plugins:
//!   - search
//!   - confluence-publisher:
//!       space_key: HANDBOOK
//!       parent_page_id: 123456
//!       confluence_prefix: "Handbook - "
//!       enabled_if_env: PUBLISH_TO_CONFLUENCE
//!       api_token: !ENV CONFLUENCE_API_TOKEN
//! ```
//!
//! ## Environment Variables
//!
//! Plugin option strings support `${VAR}` and `${VAR:-default}` expansion as
//! well as the MkDocs `!ENV` tag. Connection settings not given in the plugin
//! block fall back to `CONFLUENCE_URL`, `CONFLUENCE_USERNAME` and
//! `CONFLUENCE_API_TOKEN`.
//!
//! CLI settings can be applied during load via [`CliSettings`].

mod expand;
mod nav;
mod yaml;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

pub use nav::NavEntry;

/// Configuration filenames to search for, in order.
const CONFIG_FILENAMES: [&str; 2] = ["mkdocs.yml", "mkdocs.yaml"];

/// Name of the plugin entry in the `plugins` list.
pub const PLUGIN_NAME: &str = "confluence-publisher";

/// Environment variable holding the Confluence base URL.
pub const URL_ENV: &str = "CONFLUENCE_URL";
/// Environment variable holding the Confluence username.
pub const USERNAME_ENV: &str = "CONFLUENCE_USERNAME";
/// Environment variable holding the Confluence API token.
pub const API_TOKEN_ENV: &str = "CONFLUENCE_API_TOKEN";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override target space key.
    pub space_key: Option<String>,
    /// Override the page all mirrored pages are created under.
    pub parent_page_id: Option<String>,
    /// Override page title prefix.
    pub page_prefix: Option<String>,
    /// Override page title suffix.
    pub page_suffix: Option<String>,
}

/// Loaded project configuration.
#[derive(Debug)]
pub struct Config {
    /// `site_name` from `mkdocs.yml`.
    pub site_name: String,
    /// Absolute docs directory.
    pub docs_dir: PathBuf,
    /// Path of the loaded config file.
    pub config_path: PathBuf,
    /// Explicit navigation, if configured.
    pub nav: Option<Vec<NavEntry>>,
    /// Publisher plugin options, if the plugin block is present.
    pub publisher: Option<PublisherConfig>,
}

/// Options of the `confluence-publisher` plugin block.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Target Confluence space key.
    pub space_key: String,
    /// Page under which the navigation root is mirrored (space root if `None`).
    pub parent_page_id: Option<String>,
    /// Prepended to every page title.
    pub page_prefix: String,
    /// Appended to every page title.
    pub page_suffix: String,
    /// Publishing only runs when this environment variable is truthy.
    pub enabled_if_env: Option<String>,
    /// Kroki server used to render diagram code blocks.
    pub kroki_url: Option<String>,
    /// Code macro language replacements (Confluence rejects some languages).
    pub code_language_aliases: BTreeMap<String, String>,
    /// Prepend a table of contents macro to pages with headings.
    pub toc: bool,
    /// Drop the first H1 from page bodies (the page title already shows it).
    pub strip_title_heading: bool,
    /// Version comment attached to page updates.
    pub version_message: Option<String>,
    /// Connection settings from the plugin block.
    pub connection: ConnectionSettings,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            space_key: String::new(),
            parent_page_id: None,
            page_prefix: String::new(),
            page_suffix: String::new(),
            enabled_if_env: None,
            kroki_url: None,
            code_language_aliases: default_code_language_aliases(),
            toc: false,
            strip_title_heading: false,
            version_message: None,
            connection: ConnectionSettings::default(),
        }
    }
}

/// Connection settings as written in the plugin block (all optional).
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    /// Confluence base URL.
    pub base_url: Option<String>,
    /// Account username or email.
    pub username: Option<String>,
    /// API token or personal access token.
    pub api_token: Option<String>,
}

/// Resolved and validated Confluence connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Confluence base URL (e.g. `https://example.atlassian.net/wiki`).
    pub base_url: String,
    /// Username for Basic auth; `None` selects Bearer token auth.
    pub username: Option<String>,
    /// API token (Basic) or personal access token (Bearer).
    pub api_token: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No config file found by discovery.
    #[error("No mkdocs.yml found in {} or its parents", .0.display())]
    NotDiscovered(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Plugin option name (e.g., "`api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Raw `mkdocs.yml` fields mkconf cares about.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MkdocsRaw {
    site_name: Option<String>,
    docs_dir: Option<String>,
    nav: Option<Value>,
    plugins: Option<Value>,
}

/// Raw plugin options as written in `mkdocs.yml`.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct PluginOptionsRaw {
    space_key: Option<String>,
    #[serde(deserialize_with = "yaml::string_or_number")]
    parent_page_id: Option<String>,
    confluence_prefix: Option<String>,
    confluence_suffix: Option<String>,
    enabled_if_env: Option<String>,
    kroki_url: Option<String>,
    code_language_aliases: Option<BTreeMap<String, String>>,
    #[serde(deserialize_with = "yaml::flexible_bool")]
    toc: Option<bool>,
    #[serde(deserialize_with = "yaml::flexible_bool")]
    strip_title_heading: Option<bool>,
    version_message: Option<String>,
    confluence_url: Option<String>,
    username: Option<String>,
    api_token: Option<String>,
}

fn default_code_language_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("json".to_owned(), "yaml".to_owned())])
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Treat empty strings the same as absent values.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parent page id, with an empty value or `0` meaning the space root.
fn parent_page_id(value: Option<String>) -> Option<String> {
    non_empty(value)
        .map(|id| id.trim().to_owned())
        .filter(|id| id != "0")
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `mkdocs.yml` (or `mkdocs.yaml`) in the current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, parsing fails or plugin
    /// options are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            path.to_path_buf()
        } else {
            let cwd = std::env::current_dir()?;
            Self::discover_config(&cwd).ok_or(ConfigError::NotDiscovered(cwd))?
        };

        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        Ok(config)
    }

    /// Get validated publisher configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the plugin block is missing or
    /// has no space key.
    pub fn require_publisher(&self) -> Result<&PublisherConfig, ConfigError> {
        let publisher = self.publisher.as_ref().ok_or_else(|| {
            ConfigError::Validation(format!(
                "'{PLUGIN_NAME}' plugin not configured in {}",
                self.config_path.display()
            ))
        })?;
        publisher.validate()?;
        Ok(publisher)
    }

    /// Search for a config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_FILENAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    /// Parse configuration from YAML text; `path` anchors relative paths.
    fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let document: Value = serde_yaml::from_str(content)?;
        let raw: MkdocsRaw = serde_yaml::from_value(yaml::resolve_env_tags(document))?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        let docs_dir = config_dir.join(raw.docs_dir.as_deref().unwrap_or("docs"));
        let nav = raw.nav.as_ref().map(nav::parse_nav).transpose()?;

        let publisher = match raw.plugins.as_ref().and_then(find_plugin_options) {
            Some(options) => Some(PublisherConfig::from_options(options)?),
            None => None,
        };
        debug!(
            path = %path.display(),
            has_nav = nav.is_some(),
            has_publisher = publisher.is_some(),
            "Loaded MkDocs config"
        );

        Ok(Self {
            site_name: raw.site_name.unwrap_or_default(),
            docs_dir,
            config_path: path.to_path_buf(),
            nav,
            publisher,
        })
    }

    /// Apply CLI settings to the configuration.
    ///
    /// A `space_key` override enables publishing even without a plugin block.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if self.publisher.is_none() && settings.space_key.is_some() {
            self.publisher = Some(PublisherConfig::default());
        }
        let Some(publisher) = self.publisher.as_mut() else {
            return;
        };
        if let Some(space_key) = &settings.space_key {
            publisher.space_key.clone_from(space_key);
        }
        if let Some(parent) = &settings.parent_page_id {
            publisher.parent_page_id = parent_page_id(Some(parent.clone()));
        }
        if let Some(prefix) = &settings.page_prefix {
            publisher.page_prefix.clone_from(prefix);
        }
        if let Some(suffix) = &settings.page_suffix {
            publisher.page_suffix.clone_from(suffix);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            publisher.kroki_url = Some(kroki_url.clone());
        }
    }
}

/// Locate the publisher options in a `plugins` value.
///
/// `plugins` may be a list (`- name` or `- name: {..}`) or a mapping.
fn find_plugin_options(plugins: &Value) -> Option<Value> {
    match plugins {
        Value::Sequence(items) => items.iter().find_map(|item| match item {
            Value::String(name) if name == PLUGIN_NAME => Some(Value::Null),
            Value::Mapping(map) => map.get(PLUGIN_NAME).cloned(),
            _ => None,
        }),
        Value::Mapping(map) => map.get(PLUGIN_NAME).cloned(),
        _ => None,
    }
}

impl PublisherConfig {
    /// Build from the raw plugin options value (null means "all defaults").
    fn from_options(options: Value) -> Result<Self, ConfigError> {
        let raw: PluginOptionsRaw = if options.is_null() {
            PluginOptionsRaw::default()
        } else {
            serde_yaml::from_value(options)?
        };

        let defaults = Self::default();
        Ok(Self {
            space_key: expand::expand_env(
                raw.space_key.as_deref().unwrap_or_default(),
                "space_key",
            )?,
            parent_page_id: parent_page_id(expand::expand_opt(
                raw.parent_page_id,
                "parent_page_id",
            )?),
            page_prefix: expand::expand_opt(raw.confluence_prefix, "confluence_prefix")?
                .unwrap_or_default(),
            page_suffix: expand::expand_opt(raw.confluence_suffix, "confluence_suffix")?
                .unwrap_or_default(),
            enabled_if_env: non_empty(raw.enabled_if_env),
            kroki_url: non_empty(expand::expand_opt(raw.kroki_url, "kroki_url")?),
            code_language_aliases: raw
                .code_language_aliases
                .unwrap_or(defaults.code_language_aliases),
            toc: raw.toc.unwrap_or(defaults.toc),
            strip_title_heading: raw
                .strip_title_heading
                .unwrap_or(defaults.strip_title_heading),
            version_message: non_empty(expand::expand_opt(
                raw.version_message,
                "version_message",
            )?),
            connection: ConnectionSettings {
                base_url: non_empty(expand::expand_opt(raw.confluence_url, "confluence_url")?),
                username: non_empty(expand::expand_opt(raw.username, "username")?),
                api_token: non_empty(expand::expand_opt(raw.api_token, "api_token")?),
            },
        })
    }

    /// Validate the options required for publishing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.space_key, "space_key")?;
        if let Some(kroki_url) = &self.kroki_url {
            require_http_url(kroki_url, "kroki_url")?;
        }
        if let Some(id) = &self.parent_page_id
            && !id.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Validation(format!(
                "parent_page_id must be numeric, got '{id}'"
            )));
        }
        Ok(())
    }

    /// Whether the environment gate allows publishing.
    ///
    /// Without `enabled_if_env` publishing is always enabled.
    pub fn is_enabled(&self) -> bool {
        let Some(var) = &self.enabled_if_env else {
            return true;
        };
        std::env::var(var)
            .ok()
            .and_then(|v| yaml::parse_truthy(&v))
            .unwrap_or(false)
    }

    /// Remote page title for a local title.
    pub fn page_title(&self, title: &str) -> String {
        format!("{}{title}{}", self.page_prefix, self.page_suffix)
    }

    /// Resolve connection settings, falling back to environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL or token is missing or invalid.
    pub fn require_connection(&self) -> Result<ConnectionConfig, ConfigError> {
        let from_env = |name: &str| non_empty(std::env::var(name).ok());

        let base_url = self
            .connection
            .base_url
            .clone()
            .or_else(|| from_env(URL_ENV))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Confluence URL not set (plugin option confluence_url or {URL_ENV})"
                ))
            })?;
        require_http_url(&base_url, "confluence_url")?;

        let api_token = self
            .connection
            .api_token
            .clone()
            .or_else(|| from_env(API_TOKEN_ENV))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Confluence API token not set (plugin option api_token or {API_TOKEN_ENV})"
                ))
            })?;

        let username = self
            .connection
            .username
            .clone()
            .or_else(|| from_env(USERNAME_ENV));

        Ok(ConnectionConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            username,
            api_token,
        })
    }
}
