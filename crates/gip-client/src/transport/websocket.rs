//! WebSocket transport. Each request envelope rides in one text frame
//! and the matching response comes back in one text frame, so unlike the
//! stream-socket transport there is no partial-message accumulation;
//! frames still pass through the shared codec for shape validation.

use std::net::TcpStream;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use tracing::warn;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::Message;
use tungstenite::WebSocket;

use gip_ipc::decode;
use gip_ipc::encode_request;
use gip_ipc::Decoded;
use gip_ipc::Request;
use gip_ipc::WireMessage;

use crate::error::ClientError;
use crate::transport::unwrap_response;
use crate::transport::Transport;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    next_id: u64,
    timeout: Duration,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            socket: None,
            next_id: 0,
            timeout,
        }
    }

    fn read_response(&mut self, expected_id: u64) -> Result<Value, ClientError> {
        loop {
            let socket = self.socket.as_mut().ok_or(ClientError::NotConnected)?;
            let message = match socket.read() {
                Ok(message) => message,
                Err(tungstenite::Error::Io(e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    self.disconnect();
                    return Err(ClientError::Timeout(self.timeout));
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.socket = None;
                    return Err(ClientError::ConnectionClosed);
                }
                Err(e) => {
                    self.disconnect();
                    return Err(ClientError::WebSocket(e.to_string()));
                }
            };

            let text = match message {
                Message::Text(text) => text,
                // Control frames are handled by tungstenite; just keep
                // waiting for the reply.
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => {
                    self.disconnect();
                    return Err(ClientError::ConnectionClosed);
                }
                other => {
                    warn!(?other, "ignoring non-text frame");
                    continue;
                }
            };

            match decode(text.as_bytes()) {
                Ok(Decoded::Message {
                    message: WireMessage::Response(response),
                    ..
                }) => return unwrap_response(response, expected_id),
                Ok(Decoded::Message { .. }) | Ok(Decoded::Incomplete) => {
                    self.disconnect();
                    return Err(ClientError::InvalidResponse);
                }
                Err(e) => {
                    self.disconnect();
                    return Err(e.into());
                }
            }
        }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn kind(&self) -> &'static str {
        "websocket"
    }

    fn connect(&mut self, target: &str) -> bool {
        let (socket, _) = match tungstenite::connect(target) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(target, error = %e, "websocket connect failed");
                return false;
            }
        };

        // Built without TLS, so every connection is a plain TcpStream;
        // the blocking read needs a deadline on it.
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            if let Err(e) = stream.set_read_timeout(Some(self.timeout)) {
                warn!(error = %e, "failed to set read timeout");
                return false;
            }
        }

        debug!(target, "connected");
        self.socket = Some(socket);
        self.next_id = 0;
        true
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn send(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.next_id += 1;
        let id = self.next_id;
        let request = Request::new(id, method, params);
        let bytes = encode_request(&request)?;
        let text = String::from_utf8(bytes).map_err(|_| ClientError::InvalidResponse)?;

        let socket = self.socket.as_mut().ok_or(ClientError::NotConnected)?;
        debug!(method, id, "sending request frame");
        if let Err(e) = socket.send(Message::Text(text)) {
            self.disconnect();
            return Err(ClientError::WebSocket(e.to_string()));
        }

        self.read_response(id)
    }

    fn disconnect(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None);
            // Drive the close handshake; errors here only mean the peer
            // is already gone.
            let _ = socket.flush();
            debug!("disconnected");
        }
    }
}
