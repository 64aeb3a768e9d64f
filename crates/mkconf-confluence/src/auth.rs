//! Authorization header construction.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use mkconf_config::ConnectionConfig;

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Username and API token (Confluence Cloud) or password.
    Basic { username: String, token: String },
    /// Personal access token (Confluence Server/Data Center).
    Bearer(String),
}

impl Auth {
    /// Basic auth when a username is configured, bearer token otherwise.
    #[must_use]
    pub fn from_connection(connection: &ConnectionConfig) -> Self {
        match &connection.username {
            Some(username) => Self::Basic {
                username: username.clone(),
                token: connection.api_token.clone(),
            },
            None => Self::Bearer(connection.api_token.clone()),
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic { username, token } => {
                let encoded = BASE64_STANDARD.encode(format!("{username}:{token}"));
                format!("Basic {encoded}")
            }
            Self::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

// Never print the token.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}
