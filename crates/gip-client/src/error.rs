use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between an adapter and its target. The
/// controller converts any of these into a structured error envelope;
/// nothing here crosses the controller boundary as a fault.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Protocol(#[from] gip_ipc::ProtocolError),

    /// `send` before a successful `connect`. A usage error, not a
    /// network one.
    #[error("not connected; call connect() first")]
    NotConnected,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection closed by target")]
    ConnectionClosed,

    /// Top-level `error` string in the response envelope.
    #[error("{0}")]
    Remote(String),

    #[error("response id {got} does not match request id {expected}")]
    IdMismatch { expected: u64, got: u64 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("invalid response from target")]
    InvalidResponse,
}
