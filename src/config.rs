//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Public endpoint of the administrative API.
pub const DEFAULT_ADMIN_ENDPOINT: &str = "https://appengine.googleapis.com";
/// Host of the instance metadata server.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Settings for the administrative API client, merged from defaults,
/// `modctl.toml`, and `MODULES_ADMIN_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "MODULES_ADMIN",
    discovery(
        app_name = "modctl",
        env_var = "MODCTL_CONFIG_PATH",
        config_file_name = "modctl.toml",
        dotfile_name = ".modctl.toml",
        project_file_name = "modctl.toml"
    )
)]
pub struct AdminApiConfig {
    /// Base URL of the administrative API.
    #[ortho_config(default = DEFAULT_ADMIN_ENDPOINT.to_owned())]
    pub endpoint: String,
    /// Static bearer token. When absent, a token is requested from the
    /// metadata server on every call.
    pub access_token: Option<String>,
    /// Host (optionally with port) of the metadata server.
    #[ortho_config(default = DEFAULT_METADATA_HOST.to_owned())]
    pub metadata_host: String,
    /// Upper bound on a single request when the caller sets no deadline.
    #[ortho_config(default = 60)]
    pub timeout_secs: u64,
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ADMIN_ENDPOINT.to_owned(),
            access_token: None,
            metadata_host: DEFAULT_METADATA_HOST.to_owned(),
            timeout_secs: 60,
        }
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to modctl.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const ENDPOINT_FIELD: FieldMetadata = FieldMetadata::new(
    "admin API endpoint",
    "MODULES_ADMIN_ENDPOINT",
    "endpoint",
);
const METADATA_HOST_FIELD: FieldMetadata = FieldMetadata::new(
    "metadata server host",
    "MODULES_ADMIN_METADATA_HOST",
    "metadata_host",
);
const TIMEOUT_FIELD: FieldMetadata = FieldMetadata::new(
    "request timeout",
    "MODULES_ADMIN_TIMEOUT_SECS",
    "timeout_secs",
);

impl AdminApiConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("modctl")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and TOML key that supply each value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required value is blank
    /// and [`ConfigError::Invalid`] when the endpoint is not a base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ENDPOINT_FIELD.missing());
        }
        self.endpoint_url()?;
        if self.timeout_secs == 0 {
            return Err(TIMEOUT_FIELD.missing());
        }
        let needs_metadata = self
            .access_token
            .as_deref()
            .is_none_or(|token| token.trim().is_empty());
        if needs_metadata && self.metadata_host.trim().is_empty() {
            return Err(METADATA_HOST_FIELD.missing());
        }
        Ok(())
    }

    /// Parses the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint is not an absolute
    /// URL that can carry a path.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::Invalid {
            field: ENDPOINT_FIELD.env_var.to_owned(),
            value: self.endpoint.clone(),
        };
        let url = Url::parse(self.endpoint.trim()).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(url)
    }

    /// Default per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration value cannot be used.
    #[error("invalid value '{value}' for {field}")]
    Invalid {
        /// Environment variable naming the field.
        field: String,
        /// Rejected value.
        value: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
