//! Adapter for web frameworks reachable over HTTP or WebSocket.
//!
//! The target URL decides the transport: `ws://` uses WebSocket frames,
//! `http(s)://` posts one request per call. The remote side exposes the
//! same operation set as the embedded server, so calls pass through
//! unchanged; `select` and `wait_for` keep the unsupported default
//! until a web target implements them.

use serde_json::json;
use serde_json::Value;

use gip_core::ElementNode;

use crate::adapter::AppInfo;
use crate::adapter::ConnectOutcome;
use crate::adapter::FrameworkAdapter;
use crate::error::ClientError;
use crate::transport::HttpTransport;
use crate::transport::Transport;
use crate::transport::WebSocketTransport;

pub struct WebAdapter {
    transport: Option<Box<dyn Transport>>,
}

impl WebAdapter {
    pub fn new() -> Self {
        Self { transport: None }
    }

    // The websocket stack is built without TLS, so only plain ws:// is
    // offered; encrypted targets go through https.
    fn transport_for(target: &str) -> Result<Box<dyn Transport>, String> {
        if target.starts_with("ws://") {
            Ok(Box::new(WebSocketTransport::new()))
        } else if target.starts_with("http://") || target.starts_with("https://") {
            Ok(Box::new(HttpTransport::new()))
        } else {
            Err(format!(
                "Unsupported target '{}'. Expected an http(s):// or ws:// URL.",
                target
            ))
        }
    }

    fn call(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let transport = self.transport.as_mut().ok_or(ClientError::NotConnected)?;
        transport.send(method, params)
    }
}

impl Default for WebAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkAdapter for WebAdapter {
    fn framework_name(&self) -> &'static str {
        "web"
    }

    fn connect(&mut self, target: &str) -> ConnectOutcome {
        let mut transport = match Self::transport_for(target) {
            Ok(transport) => transport,
            Err(message) => return ConnectOutcome::failed(message),
        };

        if !transport.connect(target) {
            return ConnectOutcome::failed(format!(
                "Could not connect to '{}'. Is the application running?",
                target
            ));
        }

        let info = AppInfo {
            framework: self.framework_name().to_string(),
            transport: transport.kind().to_string(),
            target: target.to_string(),
        };
        self.transport = Some(transport);
        ConnectOutcome::connected(info)
    }

    fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.disconnect();
        }
    }

    fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .map(|t| t.is_connected())
            .unwrap_or(false)
    }

    fn ping(&mut self) -> Result<Value, ClientError> {
        self.call("ping", json!({}))
    }

    fn snapshot(&mut self) -> Result<ElementNode, ClientError> {
        let result = self.call("snapshot", json!({}))?;
        serde_json::from_value(result).map_err(|_| ClientError::InvalidResponse)
    }

    fn click(&mut self, element_ref: &str, button: &str) -> Result<Value, ClientError> {
        self.call("click", json!({"ref": element_ref, "button": button}))
    }

    fn type_text(
        &mut self,
        element_ref: &str,
        text: &str,
        submit: bool,
    ) -> Result<Value, ClientError> {
        self.call(
            "type",
            json!({"ref": element_ref, "text": text, "submit": submit}),
        )
    }
}
