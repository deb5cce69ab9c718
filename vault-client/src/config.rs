//! Configuration loading for vault-client.
//!
//! Configuration is loaded from a TOML file (default: `vault.toml`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration for the sync client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Remote vault server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credentials for the remote vault.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Remote vault server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the vault server (default: http://127.0.0.1:8080).
    #[serde(default = "default_url")]
    pub url: String,
    /// Path of the sync endpoint (default: /api/sync).
    #[serde(default = "default_sync_path")]
    pub sync_path: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Credentials configuration.
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Bearer token sent with every request.
    pub access_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// Default value functions
fn default_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_sync_path() -> String {
    "/api/sync".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            sync_path: default_sync_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server.url.starts_with("http://") || self.server.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "server.url must be http(s), got {:?}",
                self.server.url
            )));
        }
        if !self.server.sync_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.sync_path must start with '/', got {:?}",
                self.server.sync_path
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl FromStr for ClientConfig {
    type Err = ConfigError;

    /// Parse configuration from a TOML string and validate it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s).map_err(ConfigError::InvalidToml)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to parse configuration text.
    #[error("failed to parse config: {0}")]
    InvalidToml(#[source] toml::de::Error),
    /// Configuration parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.server.url, "http://127.0.0.1:8080");
        assert_eq!(config.server.sync_path, "/api/sync");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.auth.access_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[server]
url = "https://vault.example.com"
sync_path = "/v2/sync"
request_timeout_secs = 10

[auth]
access_token = "abc123"
"#;

        let config = ClientConfig::from_str(toml).unwrap();
        assert_eq!(config.server.url, "https://vault.example.com");
        assert_eq!(config.server.sync_path, "/v2/sync");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.auth.access_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let toml = r#"
[server]
url = "https://vault.example.com"
"#;

        let config: ClientConfig = toml.parse().unwrap();
        assert_eq!(config.server.sync_path, "/api/sync");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.auth.access_token.is_none());
    }

    #[test]
    fn from_str_rejects_bad_toml() {
        let result = ClientConfig::from_str("[server\nurl = ");
        assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn from_str_validates() {
        let result = ClientConfig::from_str("[server]\nsync_path = \"api/sync\"");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nurl = \"https://vault.example.com\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.url, "https://vault.example.com");
    }

    #[test]
    fn from_file_rejects_bad_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nurl = \"ftp://vault.example.com\"").unwrap();

        let result = ClientConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = ClientConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nurl = ").unwrap();

        let result = ClientConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = ClientConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_access_token() {
        let mut config = ClientConfig::default();
        config.auth.access_token = Some("abc123".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("abc123"));
    }
}
