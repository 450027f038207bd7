//! Adapter for applications that embed the command server directly.
//!
//! The target already speaks the protocol, so every operation is a
//! passthrough over the stream-socket transport; no translation layer
//! sits between the adapter and the wire.

use serde_json::json;
use serde_json::Value;

use gip_core::ElementNode;

use crate::adapter::AppInfo;
use crate::adapter::ConnectOutcome;
use crate::adapter::FrameworkAdapter;
use crate::error::ClientError;
use crate::transport::Transport;
use crate::transport::UnixSocketTransport;

pub struct EmbeddedAdapter {
    transport: UnixSocketTransport,
}

impl EmbeddedAdapter {
    pub fn new() -> Self {
        Self {
            transport: UnixSocketTransport::new(),
        }
    }

    fn call(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.transport.send(method, params)
    }
}

impl Default for EmbeddedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkAdapter for EmbeddedAdapter {
    fn framework_name(&self) -> &'static str {
        "embedded"
    }

    fn connect(&mut self, target: &str) -> ConnectOutcome {
        if !self.transport.connect(target) {
            return ConnectOutcome::failed(format!(
                "Could not connect to '{}'. Is the application running?",
                target
            ));
        }
        ConnectOutcome::connected(AppInfo {
            framework: self.framework_name().to_string(),
            transport: self.transport.kind().to_string(),
            target: target.to_string(),
        })
    }

    fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
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

    fn select(&mut self, element_ref: &str, target: Value) -> Result<Value, ClientError> {
        let mut params = json!({"ref": element_ref});
        if let (Value::Object(params), Value::Object(target)) = (&mut params, target) {
            params.extend(target);
        }
        self.call("select", params)
    }

    fn wait_for(
        &mut self,
        element_ref: &str,
        condition: &str,
        timeout_ms: u64,
    ) -> Result<Value, ClientError> {
        self.call(
            "wait_for",
            json!({"ref": element_ref, "condition": condition, "timeout": timeout_ms}),
        )
    }
}
