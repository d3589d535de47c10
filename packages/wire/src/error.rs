//! Error types for the wire layer.

/// Errors raised while moving values on and off the wire.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON cannot represent NaN or infinities.
    #[error("cannot encode non-finite number {value}")]
    NonFiniteNumber { value: f64 },

    /// A body did not have the expected envelope shape.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope { message: String },

    /// Typed conversion through serde failed.
    #[error("serde conversion failed: {0}")]
    Serde(#[from] serde_json::Error),
}
