//! Error types for Lykeion.
//!
//! This module provides the [`LykeionError`] type, the standard error type
//! used throughout the pipeline, and the serializable [`ErrorEnvelope`]
//! surfaced to callers.
//!
//! The taxonomy follows the pipeline contract: `BadRequest` for a missing or
//! invalid required argument, `NotFound` for an absent referenced resource,
//! `Unauthorized` for a policy denial, `Internal` for everything the caller
//! cannot act on, and `External` for downstream compute-unit failures passed
//! through with their original flavor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`LykeionError`].
pub type LykeionResult<T> = Result<T, LykeionError>;

/// Kinds of errors for classification and envelope rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or invalid required argument.
    BadRequest,
    /// Referenced resource absent.
    NotFound,
    /// Authorization policy denial.
    Unauthorized,
    /// Internal error, including store-originated failures.
    Internal,
    /// Failure of a nested external compute unit.
    External,
}

impl ErrorKind {
    /// Returns the wire name of this kind, as carried in the error envelope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::Internal => "Internal",
            Self::External => "External",
        }
    }
}

/// Standard error type for the Lykeion pipeline.
///
/// # Example
///
/// ```
/// use lykeion_core::LykeionError;
///
/// fn require_course_id(id: Option<&str>) -> Result<&str, LykeionError> {
///     id.ok_or_else(|| LykeionError::bad_request("Course ID is required"))
/// }
/// ```
#[derive(Error, Debug)]
pub enum LykeionError {
    /// A required argument is missing or malformed.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// A referenced resource does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// The authorization policy denied the operation.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable denial reason.
        message: String,
        /// The operation that was denied.
        operation: Option<String>,
    },

    /// Internal failure, including store-originated errors.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to callers).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A nested external compute unit failed.
    #[error("External error: {message}")]
    External {
        /// Human-readable error message.
        message: String,
        /// The original error type reported by the external unit, when known.
        original_type: Option<String>,
    },
}

impl LykeionError {
    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not-found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_type} '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            operation: None,
        }
    }

    /// Creates an unauthorized error naming the denied operation.
    #[must_use]
    pub fn unauthorized_for(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an external error carrying the downstream error type.
    #[must_use]
    pub fn external(
        message: impl Into<String>,
        original_type: Option<impl Into<String>>,
    ) -> Self {
        Self::External {
            message: message.into(),
            original_type: original_type.map(Into::into),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::External { .. } => ErrorKind::External,
        }
    }

    /// Returns the wire error type for the envelope.
    ///
    /// External errors keep the original downstream type when one was
    /// reported, so pass-through propagation does not rewrite the flavor.
    #[must_use]
    pub fn error_type(&self) -> &str {
        match self {
            Self::External {
                original_type: Some(t),
                ..
            } => t,
            other => other.kind().as_str(),
        }
    }

    /// Converts this error to the serializable caller-facing envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            message: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }
}

/// Serializable error envelope surfaced to callers.
///
/// Carries exactly `{message, type}` per the external interface contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error type.
    #[serde(rename = "type")]
    pub error_type: String,
}
