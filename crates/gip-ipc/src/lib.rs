#![deny(clippy::all)]

//! GUI Instrumentation Protocol (GIP) primitives shared by the controller
//! side and the in-target command server: the request/response envelope,
//! the typed method catalogue, the incremental wire codec, and the
//! stream-socket endpoint convention.

mod codec;
mod command;
mod endpoint;
mod envelope;
mod error;

pub use codec::decode;
pub use codec::encode_request;
pub use codec::encode_response;
pub use codec::Decoded;
pub use codec::WireMessage;
pub use command::Command;
pub use command::CommandError;
pub use command::MouseButton;
pub use command::SelectTarget;
pub use command::WaitCondition;
pub use command::METHOD_NAMES;
pub use endpoint::endpoint_path;
pub use endpoint::DEFAULT_SERVER_NAME;
pub use envelope::Request;
pub use envelope::Response;
pub use error::ProtocolError;
