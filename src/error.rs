//! Unified error handling for the ado-rest library.
//!
//! The hierarchy is built with `thiserror` so callers can match on the failure
//! category instead of parsing messages.
//!
//! ## Error Categories
//!
//! - [`ConfigError`]: missing or malformed client configuration, raised when the
//!   client is constructed
//! - [`ApiError`]: transport failures, non-success responses and response bodies
//!   that do not match the expected shape
//!
//! Nothing in the library retries or recovers from these errors; they are handed
//! to the caller as they happened.
//!
//! ## Example
//!
//! ```rust
//! use ado_rest::error::{AdoError, ConfigError};
//!
//! fn example() -> Result<(), AdoError> {
//!     Err(ConfigError::MissingRequired {
//!         field: "organization".to_string(),
//!         env_var: "AZURE_DEVOPS_ORGANIZATION".to_string(),
//!     })?;
//!     Ok(())
//! }
//!
//! assert!(example().is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ado-rest library.
#[derive(Error, Debug)]
pub enum AdoError {
    /// An error occurred while talking to the Azure DevOps API.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// An error occurred while loading or validating configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A generic error for cases not covered by specific error types.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Errors that can occur when calling the Azure DevOps API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, connection reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    ///
    /// The body is kept verbatim; no attempt is made to classify the status.
    #[error("API request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse API response: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The response was JSON but did not match the expected record.
    #[error("Unexpected response shape, expected {expected}: {message}")]
    UnexpectedShape {
        /// Name of the record that was expected.
        expected: &'static str,
        /// Decoder message.
        message: String,
    },

    /// The request URL could not be built from the configured base URL.
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A request parameter could not be rendered into the query string.
    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        message: String,
    },
}

impl ApiError {
    /// Builds an [`ApiError::UnexpectedShape`] from a serde decoding failure.
    pub(crate) fn shape(expected: &'static str, err: serde_json::Error) -> Self {
        Self::UnexpectedShape {
            expected,
            message: err.to_string(),
        }
    }
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("{field} is required (use --{field}, {env_var} env var, or config file)")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
        /// Environment variable name for this field.
        env_var: String,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file at {path}: {message}")]
    FileReadError {
        /// Path to the config file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// The config directory could not be determined or created.
    #[error("Failed to prepare config directory at {path}: {message}")]
    DirectoryCreationError {
        /// Path where directory creation failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Result alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Type alias for Results using AdoError.
pub type AdoResult<T> = std::result::Result<T, AdoError>;
