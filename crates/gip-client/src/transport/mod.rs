//! Channel abstractions carrying encoded GIP requests to a target.
//!
//! Each variant owns one connection and serializes requests over it: at
//! most one request is in flight at a time, so responses never need to
//! be correlated against interleaved peers. A request timeout closes the
//! underlying connection rather than abandoning the logical wait, and
//! leaves the transport disconnected.

mod http;
mod unix_socket;
mod websocket;

pub use http::HttpTransport;
pub use unix_socket::UnixSocketTransport;
pub use websocket::WebSocketTransport;

use serde_json::Value;

use crate::error::ClientError;

pub trait Transport: Send {
    /// Short transport identifier for `app_info` ("unix_socket", "http",
    /// "websocket").
    fn kind(&self) -> &'static str;

    /// Open a connection to `target`. Recoverable failures (endpoint
    /// missing, peer refusing) return `false` with the reason logged;
    /// the adapter turns that into a structured connect result.
    fn connect(&mut self, target: &str) -> bool;

    fn is_connected(&self) -> bool;

    /// Send one request and block until its response is decoded. Returns
    /// the `result` payload, or `ClientError::Remote` for a top-level
    /// protocol error from the peer.
    fn send(&mut self, method: &str, params: Value) -> Result<Value, ClientError>;

    /// Idempotent; safe to call when never connected.
    fn disconnect(&mut self);
}

/// Shared handling of a decoded response envelope.
pub(crate) fn unwrap_response(
    response: gip_ipc::Response,
    expected_id: u64,
) -> Result<Value, ClientError> {
    if response.id != expected_id {
        return Err(ClientError::IdMismatch {
            expected: expected_id,
            got: response.id,
        });
    }
    if let Some(message) = response.error {
        return Err(ClientError::Remote(message));
    }
    response.result.ok_or(ClientError::InvalidResponse)
}
