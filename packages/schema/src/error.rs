//! Error types for schema compilation.

/// Configuration errors found while compiling a schema.
///
/// These are raised once, when a service or proxy is built, never while
/// serving a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A name cannot be used as a path component.
    #[error("invalid name '{name}': {message}")]
    InvalidName { name: String, message: String },

    /// Two leaves derive the same path.
    #[error("duplicate route '{path}': declared by both '{first}' and '{second}'")]
    DuplicateRoute {
        path: String,
        first: String,
        second: String,
    },

    /// An error type was claimed twice.
    #[error("duplicate error type at '{path}': {message}")]
    DuplicateError { path: String, message: String },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
