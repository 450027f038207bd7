//! Stream-socket transport to an in-target command server.
//!
//! Connects to a named local endpoint resolved by the convention in
//! [`gip_ipc::endpoint_path`]. Messages carry no length prefix, so the
//! read loop accumulates chunks and re-offers the buffer to the codec
//! until a complete response appears.

use std::io::Read;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use gip_ipc::decode;
use gip_ipc::encode_request;
use gip_ipc::endpoint_path;
use gip_ipc::Decoded;
use gip_ipc::Request;
use gip_ipc::WireMessage;

use crate::error::ClientError;
use crate::transport::unwrap_response;
use crate::transport::Transport;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const READ_CHUNK: usize = 4096;

pub struct UnixSocketTransport {
    stream: Option<UnixStream>,
    next_id: u64,
    timeout: Duration,
}

impl UnixSocketTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            stream: None,
            next_id: 0,
            timeout,
        }
    }

    fn read_response(&mut self, expected_id: u64) -> Result<Value, ClientError> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        // The budget covers the whole response, not each read: a peer
        // trickling bytes cannot stretch one request past the deadline.
        let deadline = Instant::now() + self.timeout;

        loop {
            match decode(&buffer) {
                Ok(Decoded::Message {
                    message: WireMessage::Response(response),
                    ..
                }) => return unwrap_response(response, expected_id),
                Ok(Decoded::Message {
                    message: WireMessage::Request(_),
                    ..
                }) => {
                    self.disconnect();
                    return Err(ClientError::InvalidResponse);
                }
                Ok(Decoded::Incomplete) => {}
                Err(e) => {
                    // No framing means no resync point after garbage.
                    self.disconnect();
                    return Err(e.into());
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.disconnect();
                return Err(ClientError::Timeout(self.timeout));
            }

            let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
            if let Err(e) = stream.set_read_timeout(Some(remaining)) {
                self.disconnect();
                return Err(e.into());
            }
            match stream.read(&mut chunk) {
                Ok(0) => {
                    // Zero-byte read before a complete message: the peer
                    // closed the connection.
                    self.disconnect();
                    return Err(ClientError::ConnectionClosed);
                }
                Ok(n) => {
                    debug!(bytes = n, total = buffer.len() + n, "received chunk");
                    buffer.extend_from_slice(&chunk[..n]);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // The timeout is the only cancellation primitive;
                    // close the connection instead of abandoning the wait.
                    self.disconnect();
                    return Err(ClientError::Timeout(self.timeout));
                }
                Err(e) => {
                    self.disconnect();
                    return Err(e.into());
                }
            }
        }
    }
}

impl Default for UnixSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UnixSocketTransport {
    fn kind(&self) -> &'static str {
        "unix_socket"
    }

    fn connect(&mut self, target: &str) -> bool {
        let path = endpoint_path(target);

        if !path.exists() {
            // Missing endpoint file means the target is not running,
            // which is a normal, reportable condition.
            warn!(endpoint = %path.display(), "no endpoint; target not running");
            return false;
        }

        match UnixStream::connect(&path) {
            Ok(stream) => {
                if let Err(e) = stream
                    .set_read_timeout(Some(self.timeout))
                    .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
                {
                    warn!(error = %e, "failed to set socket timeouts");
                    return false;
                }
                debug!(endpoint = %path.display(), "connected");
                self.stream = Some(stream);
                self.next_id = 0;
                true
            }
            Err(e) => {
                warn!(endpoint = %path.display(), error = %e, "connect failed");
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn send(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        self.next_id += 1;
        let id = self.next_id;
        let request = Request::new(id, method, params);
        let bytes = encode_request(&request)?;

        debug!(method, id, "sending request");
        if let Err(e) = stream.write_all(&bytes).and_then(|_| stream.flush()) {
            self.disconnect();
            return Err(e.into());
        }

        self.read_response(id)
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            debug!("disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::AtomicU64;
    use std::sync::atomic::Ordering;
    use std::thread;

    use super::*;

    static NEXT_NAME: AtomicU64 = AtomicU64::new(0);

    fn unique_name() -> String {
        format!(
            "gip-transport-test-{}-{}",
            std::process::id(),
            NEXT_NAME.fetch_add(1, Ordering::Relaxed)
        )
    }

    #[test]
    fn test_trickling_peer_cannot_stretch_request_past_deadline() {
        let name = unique_name();
        let path = endpoint_path(&name);
        let listener = UnixListener::bind(&path).unwrap();

        // Peer drips whitespace slowly; each drip is a successful read
        // but never completes a message.
        let trickler = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 256];
            let _ = stream.read(&mut request);
            for _ in 0..40 {
                if stream.write_all(b" ").is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(50));
            }
        });

        let mut transport = UnixSocketTransport::with_timeout(Duration::from_millis(300));
        assert!(transport.connect(&name));

        let started = Instant::now();
        let outcome = transport.send("ping", serde_json::json!({}));
        let elapsed = started.elapsed();

        assert!(matches!(outcome, Err(ClientError::Timeout(_))));
        assert!(
            elapsed < Duration::from_millis(1500),
            "request ran {:?}; the per-request deadline did not hold",
            elapsed
        );
        assert!(!transport.is_connected());

        trickler.join().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_send_before_connect_is_usage_error() {
        let mut transport = UnixSocketTransport::new();
        assert!(matches!(
            transport.send("ping", serde_json::json!({})),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn test_connect_to_missing_endpoint_returns_false() {
        let mut transport = UnixSocketTransport::new();
        assert!(!transport.connect("gip-no-such-endpoint"));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut transport = UnixSocketTransport::new();
        transport.disconnect();
        transport.disconnect();
        assert!(!transport.is_connected());
    }
}
