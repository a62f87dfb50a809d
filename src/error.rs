//! Error types surfaced by the module control facade.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by every facade operation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ModulesError {
    /// Raised when the administrative API client cannot be initialised.
    #[error("module: could not create admin service: {0}")]
    ClientInit(String),
    /// Raised when the administrative API reports the module as missing.
    #[error("module: Module '{module}' not found")]
    ModuleNotFound {
        /// Module that was looked up.
        module: String,
    },
    /// Raised when an instance count is requested for a version without a
    /// fixed number of instances.
    #[error("module: version {version} is not using manual scaling")]
    NotManualScaling {
        /// Version that was inspected.
        version: String,
    },
    /// Raised when the traffic split does not name any version.
    #[error("module: could not determine default version for module '{module}'")]
    NoDefaultVersion {
        /// Module whose traffic split was inspected.
        module: String,
    },
    /// Failure reported by the administrative API.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Failure reported by the legacy RPC mechanism.
    #[error(transparent)]
    Legacy(#[from] LegacyError),
}

impl From<ConfigError> for ModulesError {
    fn from(value: ConfigError) -> Self {
        Self::ClientInit(value.to_string())
    }
}

/// Failures talking to the administrative HTTP API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("admin API error {code} ({status}): {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Canonical status name from the error body (for example
        /// `NOT_FOUND`), or the HTTP reason phrase.
        status: String,
        /// Message from the error body.
        message: String,
    },
    /// The request never produced a response.
    #[error("admin API request failed: {0}")]
    Transport(String),
    /// The response body did not match the expected resource shape.
    #[error("admin API returned an unreadable {resource}: {message}")]
    Decode {
        /// Resource being decoded.
        resource: String,
        /// Decoder message.
        message: String,
    },
    /// A resource URL could not be built from the configured endpoint.
    #[error("invalid admin API endpoint '{endpoint}'")]
    InvalidEndpoint {
        /// Configured endpoint.
        endpoint: String,
    },
}

impl ApiError {
    /// HTTP status of a [`ApiError::Status`] failure.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Transport(_) | Self::Decode { .. } | Self::InvalidEndpoint { .. } => None,
        }
    }

    /// Whether the API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { code: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// Error codes defined by the legacy `modules` service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModulesServiceCode {
    /// No error.
    Ok,
    /// The module does not exist.
    InvalidModule,
    /// The version does not exist.
    InvalidVersion,
    /// The instance count is out of range.
    InvalidInstances,
    /// A transient backend failure; the call may succeed later.
    TransientError,
    /// The version is not in a state that permits the request.
    UnexpectedState,
}

impl ModulesServiceCode {
    /// Maps a wire code to a known service code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::InvalidModule),
            2 => Some(Self::InvalidVersion),
            3 => Some(Self::InvalidInstances),
            4 => Some(Self::TransientError),
            5 => Some(Self::UnexpectedState),
            _ => None,
        }
    }

    /// Upper-case name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidModule => "INVALID_MODULE",
            Self::InvalidVersion => "INVALID_VERSION",
            Self::InvalidInstances => "INVALID_INSTANCES",
            Self::TransientError => "TRANSIENT_ERROR",
            Self::UnexpectedState => "UNEXPECTED_STATE",
        }
    }
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "thiserror passes field references to format arguments"
)]
fn service_code_name(code: &i32) -> &'static str {
    ModulesServiceCode::from_code(*code).map_or("UNKNOWN", ModulesServiceCode::name)
}

/// Failures from the legacy RPC mechanism, passed through unmodified.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LegacyError {
    /// The `modules` service rejected the call.
    #[error("API error {code} (modules: {name}): {detail}", name = service_code_name(.code))]
    Application {
        /// Service specific error code, see [`ModulesServiceCode`].
        code: i32,
        /// Detail supplied by the service.
        detail: String,
    },
    /// The RPC layer rejected the call before it reached the service.
    #[error("RPC error {code}: {detail}")]
    Rpc {
        /// RPC layer error code.
        code: i32,
        /// Detail supplied by the RPC layer.
        detail: String,
    },
    /// The service bridge could not be reached.
    #[error("service bridge HTTP failed: {0}")]
    Transport(String),
    /// The service bridge answered with something other than an RPC
    /// response.
    #[error("service bridge returned {message}")]
    Bridge {
        /// Description of the unexpected reply.
        message: String,
    },
    /// A protocol buffer could not be decoded.
    #[error("failed to decode {method} response: {message}")]
    Decode {
        /// Method whose response was malformed.
        method: String,
        /// Decoder message.
        message: String,
    },
}

impl LegacyError {
    /// Service code of an [`LegacyError::Application`] failure.
    #[must_use]
    pub const fn service_code(&self) -> Option<ModulesServiceCode> {
        match self {
            Self::Application { code, .. } => ModulesServiceCode::from_code(*code),
            Self::Rpc { .. } | Self::Transport(_) | Self::Bridge { .. } | Self::Decode { .. } => {
                None
            }
        }
    }
}

impl From<reqwest::Error> for LegacyError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}
