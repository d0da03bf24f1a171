//! Connection string resolution.
//!
//! A store is configured with a single string: either a native connection
//! URL (`mongodb://…` / `mongodb+srv://…`) or a symbolic name that the
//! process environment maps to such a URL. Resolution extracts the database
//! name from the URL path; a URL without one is a configuration error, not
//! something to default.

use thiserror::Error;
use url::Url;

const URL_SCHEMES: &[&str] = &["mongodb://", "mongodb+srv://"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("connection name {0:?} could not be resolved from the environment")]
    UnresolvedName(String),

    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("no database name specified in connection string")]
    MissingDatabase,

    #[error("failed to open database connection: {0}")]
    Connect(String),
}

/// A resolved connection: the parsed URL and the database name it targets.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: Url,
    pub database: String,
}

impl ConnectionSettings {
    /// Resolves a configuration string into connection settings.
    ///
    /// Strings carrying a known scheme are treated as URLs directly; anything
    /// else is taken as a symbolic name and looked up as an environment
    /// variable whose value must be a connection URL.
    pub fn resolve(input: &str) -> Result<Self, ConfigError> {
        if is_connection_url(input) {
            return Self::from_url_str(input);
        }

        let resolved = std::env::var(input)
            .map_err(|_| ConfigError::UnresolvedName(input.to_string()))?;
        Self::from_url_str(&resolved)
    }

    fn from_url_str(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl(err.to_string()))?;

        let database = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingDatabase)?;

        Ok(Self { url, database })
    }
}

fn is_connection_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}
