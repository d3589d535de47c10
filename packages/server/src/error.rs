//! Error types for the server.
//!
//! Two families live here:
//! - [`Error`]: building or running a service went wrong
//! - [`RestError`] and [`CallError`]: a single call failed, and how that
//!   failure is reported on the wire

use std::fmt;

use axum::http::StatusCode;
use entangle_context::ContextError;
use entangle_schema::{AppError, SchemaError};

/// Errors raised while building or serving a service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The schema could not be compiled.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A configuration value was invalid.
    #[error("invalid configuration {name}: {message}")]
    InvalidConfig { name: String, message: String },

    /// Binding or serving failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failure reported with a fixed status and short code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} ({status}): {message}")]
pub struct RestError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl RestError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400, the request body was unusable.
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_input", message)
    }

    /// 403.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    /// Replace the short code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

/// Why a procedure call failed.
#[derive(Debug)]
pub enum CallError {
    /// An expected failure with a fixed status, e.g. bad input.
    Rest(RestError),
    /// An instance of a declared error type.
    App(AppError),
    /// Anything else. Reported as a 500 with its cause chain.
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    /// Wrap an arbitrary error as an unexpected failure.
    pub fn unexpected(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CallError::Unexpected(err.into())
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Rest(err) => err.fmt(f),
            CallError::App(err) => err.fmt(f),
            CallError::Unexpected(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Unexpected(err) => err.source(),
            _ => None,
        }
    }
}

impl From<RestError> for CallError {
    fn from(err: RestError) -> Self {
        CallError::Rest(err)
    }
}

impl From<AppError> for CallError {
    fn from(err: AppError) -> Self {
        CallError::App(err)
    }
}

impl From<ContextError> for CallError {
    fn from(err: ContextError) -> Self {
        CallError::unexpected(err)
    }
}

/// Unwind payload of a panicking procedure.
#[derive(Debug, thiserror::Error)]
#[error("procedure panicked: {0}")]
pub(crate) struct Panicked(pub String);
