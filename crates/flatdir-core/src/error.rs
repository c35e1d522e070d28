//! Error types for flatdir operations.
//!
//! A single error enum covers every failure the directory core can surface: source
//! loading, filter parsing, stored credential decoding and configuration problems.
//! Authentication failures are *not* errors; they are reported through
//! [`crate::ResultCode`].

use thiserror::Error;

/// Main error type for flatdir operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A data source could not be read
    #[error("Failed to read source {path}: {message}")]
    SourceRead {
        /// Path of the source that failed
        path: String,
        /// Underlying I/O error message
        message: String,
    },

    /// A data source was read but its content is malformed
    #[error("Failed to parse source {path}: {message}")]
    SourceParse {
        /// Path of the source that failed
        path: String,
        /// Underlying parser error message
        message: String,
    },

    /// The search filter is outside the supported `(key=value)` form
    #[error("Unsupported search filter '{0}', only filter in form '(key=value)' allowed")]
    UnsupportedFilter(String),

    /// A stored credential carries a known scheme but an undecodable payload
    #[error("Failed to decode stored credential for user {user}")]
    CredentialDecode {
        /// User owning the credential
        user: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for flatdir operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceRead { .. } => "SOURCE_READ",
            Self::SourceParse { .. } => "SOURCE_PARSE",
            Self::UnsupportedFilter(_) => "UNSUPPORTED_FILTER",
            Self::CredentialDecode { .. } => "CREDENTIAL_DECODE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    ///
    /// Filter errors are caused by clients and only matter for the request that
    /// carried them.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        !matches!(self, Self::UnsupportedFilter(_))
    }

    /// Returns true if the error originates from loading a data source.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceRead { .. } | Self::SourceParse { .. })
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
