//! Error types for Bloom

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BloomError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BloomError::InvalidInput(_) => 3,
            BloomError::Api(ApiError::Authentication(_)) => 2,
            BloomError::Api(_) => 1,
            BloomError::Config(_) => 1,
            BloomError::Storage(_) => 1,
            BloomError::Lifecycle(_) => 1,
        }
    }
}

impl From<ValidationError> for BloomError {
    fn from(error: ValidationError) -> Self {
        BloomError::InvalidInput(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Failures at the Backend API boundary
///
/// Every transport or server problem is folded into one of these variants
/// before it leaves the backend implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Missing, invalid or expired credential (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server answered with a 4xx/5xx status and a message
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// The server answered `{"success": false, "reason": ...}` with a success status
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    /// HTTP status associated with the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication(_) => Some(401),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalize into the `{success: false, detail, status?}` shape
    pub fn failure(&self) -> ApiFailure {
        let detail = match self {
            ApiError::Network(detail)
            | ApiError::Authentication(detail)
            | ApiError::Rejected(detail)
            | ApiError::Decode(detail) => detail.clone(),
            ApiError::Server { detail, .. } => detail.clone(),
        };
        ApiFailure {
            success: false,
            detail,
            status: self.status(),
        }
    }
}

/// Normalized failure shape surfaced to the error display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub success: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Client-side validation failures, shown inline by the originating unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Bloom cannot be empty")]
    EmptyContent,

    #[error("Bloom content cannot exceed {limit} characters ({actual} given)")]
    ContentTooLong { limit: usize, actual: usize },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("You must be logged in to post a Bloom")]
    NotLoggedIn,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Template '{0}' is not defined")]
    MissingTemplate(String),

    #[error("Unit {0} is not attached")]
    UnknownUnit(String),

    #[error("Unit {0} has been torn down")]
    TornDown(String),
}
