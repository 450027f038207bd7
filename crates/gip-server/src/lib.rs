#![deny(clippy::all)]

//! In-process command server: the in-target half of the stream-socket
//! transport.
//!
//! The server accepts connections on a named local endpoint, decodes
//! requests, and hands each one to a task queue drained by the thread
//! that owns the live UI tree. Network I/O never touches the tree; the
//! UI thread never touches a socket.

mod backend;
mod config;
mod dispatch;
mod error;
mod queue;
mod server;
pub mod test_support;

pub use backend::ActionError;
pub use backend::UiBackend;
pub use config::ServerConfig;
pub use dispatch::dispatch;
pub use error::ServerError;
pub use queue::UiTaskQueue;
pub use server::CommandServer;
pub use server::ServerHandle;
