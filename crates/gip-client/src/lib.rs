#![deny(clippy::all)]

//! Controller side of GIP: transports that carry encoded requests to a
//! running target, framework adapters that translate the protocol's
//! operation set, and the [`Controller`] that owns the current
//! connection and normalizes every outcome into the response envelope.

pub mod adapter;
pub mod adapters;
mod controller;
mod error;
pub mod test_support;
pub mod transport;

pub use adapter::AppInfo;
pub use adapter::ConnectOutcome;
pub use adapter::FrameworkAdapter;
pub use adapters::EmbeddedAdapter;
pub use adapters::WebAdapter;
pub use controller::Controller;
pub use error::ClientError;
pub use transport::HttpTransport;
pub use transport::Transport;
pub use transport::UnixSocketTransport;
pub use transport::WebSocketTransport;
