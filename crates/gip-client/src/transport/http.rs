//! HTTP transport for targets that expose their own instrumentation
//! endpoint. One POST per call to the root path; the payload is the
//! request envelope and the reply body is the response envelope, so a
//! failed call never affects connection state.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use gip_ipc::Request;
use gip_ipc::Response;

use crate::error::ClientError;
use crate::transport::unwrap_response;
use crate::transport::Transport;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: Option<String>,
    next_id: u64,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: None,
            next_id: 0,
        }
    }

    fn post(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let base_url = self.base_url.as_ref().ok_or(ClientError::NotConnected)?;
        self.next_id += 1;
        let id = self.next_id;
        let request = Request::new(id, method, params);
        let url = format!("{}/", base_url);

        debug!(method, id, url, "posting request");
        let reply = self
            .agent
            .post(&url)
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    ClientError::Http(format!("HTTP {} from {}", code, url))
                }
                other => ClientError::Http(other.to_string()),
            })?;

        let response: Response = reply
            .into_json()
            .map_err(|_| ClientError::InvalidResponse)?;
        unwrap_response(response, id)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn connect(&mut self, target: &str) -> bool {
        self.base_url = Some(target.trim_end_matches('/').to_string());
        self.next_id = 0;

        // There is no connection to hold open; a ping proves the
        // endpoint is alive and speaks the protocol.
        match self.post("ping", Value::Object(Default::default())) {
            Ok(result) if result.get("status").and_then(Value::as_str) == Some("ok") => true,
            Ok(result) => {
                warn!(target, ?result, "ping returned unexpected payload");
                self.base_url = None;
                false
            }
            Err(e) => {
                warn!(target, error = %e, "connect ping failed");
                self.base_url = None;
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.base_url.is_some()
    }

    fn send(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        if self.base_url.is_none() {
            return Err(ClientError::NotConnected);
        }
        self.post(method, params)
    }

    fn disconnect(&mut self) {
        self.base_url = None;
    }
}
