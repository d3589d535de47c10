//! Error types for the context store.

use crate::Token;

/// Misuse of the context store.
///
/// Both variants are programmer errors: handler code asked for the current
/// request where there is none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Called outside of any request scope, e.g. at startup.
    #[error("no request context: called outside of a request scope")]
    OutsideScope,

    /// The scope's request already finished, or belongs to another store.
    #[error("no request context for token {0}: request finished or owned by another store")]
    NotFound(Token),
}

/// Result type alias for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
