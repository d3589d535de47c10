use entangle_schema::{AppError, SchemaError};
use entangle_wire::CodecError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The remote procedure failed; its error was reconstructed locally.
    #[error("remote call failed ({status}): {error}")]
    Remote { status: u16, error: AppError },

    /// The server answered with an error status but no error envelope.
    #[error("unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("{path} is synchronous and cannot be called remotely")]
    NotAsync { path: String },

    #[error("no remote function at '{path}'")]
    NotFound { path: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    /// The reconstructed application error, if the remote procedure raised one.
    pub fn app_error(&self) -> Option<&AppError> {
        match self {
            Error::Remote { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of a failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } | Error::UnexpectedResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
