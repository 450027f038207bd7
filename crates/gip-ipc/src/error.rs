use thiserror::Error;

/// Faults raised by the wire codec. `Malformed` covers bytes that can
/// never parse no matter how many more arrive; a short buffer is not an
/// error (see [`crate::Decoded::Incomplete`]).
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("message is not a request or response object: {0}")]
    UnexpectedShape(String),

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}
