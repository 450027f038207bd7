//! Framework adapter seam.
//!
//! An adapter pairs a transport with whatever translation a GUI
//! framework needs between the protocol's operation set and the
//! target's own instrumentation surface. The embedded command server
//! needs none; web frameworks tend to need more.

use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use gip_core::ElementNode;

use crate::error::ClientError;

/// Identifying details of the connected application, reported back to
/// the caller on a successful connect.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppInfo {
    pub framework: String,
    pub transport: String,
    pub target: String,
}

/// Structured result of a connect attempt. Failure to reach a target is
/// an outcome, not a fault.
#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub app_info: Option<AppInfo>,
}

impl ConnectOutcome {
    pub fn connected(app_info: AppInfo) -> Self {
        Self {
            success: true,
            error: None,
            app_info: Some(app_info),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            app_info: None,
        }
    }
}

/// One GUI framework's binding of the protocol operations.
///
/// Every operation returns the payload that goes into the response
/// envelope's `result`; transport-level trouble surfaces as
/// [`ClientError`] and is turned into an error payload by the
/// controller. `select` and `wait_for` are optional for adapters, so
/// their defaults report the operation as unsupported rather than
/// failing the connection.
pub trait FrameworkAdapter: Send {
    fn framework_name(&self) -> &'static str;

    fn connect(&mut self, target: &str) -> ConnectOutcome;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn ping(&mut self) -> Result<Value, ClientError>;

    fn snapshot(&mut self) -> Result<ElementNode, ClientError>;

    fn click(&mut self, element_ref: &str, button: &str) -> Result<Value, ClientError>;

    fn type_text(
        &mut self,
        element_ref: &str,
        text: &str,
        submit: bool,
    ) -> Result<Value, ClientError>;

    fn select(&mut self, _element_ref: &str, _target: Value) -> Result<Value, ClientError> {
        Ok(not_implemented("select", self.framework_name()))
    }

    fn wait_for(
        &mut self,
        _element_ref: &str,
        _condition: &str,
        _timeout_ms: u64,
    ) -> Result<Value, ClientError> {
        Ok(not_implemented("wait_for", self.framework_name()))
    }
}

pub(crate) fn not_implemented(operation: &str, framework: &str) -> Value {
    json!({
        "success": false,
        "error": format!("{} not implemented for {}", operation, framework),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_implemented_payload_names_operation_and_framework() {
        let payload = not_implemented("select", "embedded");
        assert_eq!(payload["success"], json!(false));
        assert_eq!(
            payload["error"],
            json!("select not implemented for embedded")
        );
    }

    #[test]
    fn test_connect_outcome_constructors() {
        let info = AppInfo {
            framework: "embedded".into(),
            transport: "unix_socket".into(),
            target: "demo".into(),
        };
        let ok = ConnectOutcome::connected(info.clone());
        assert!(ok.success);
        assert_eq!(ok.app_info, Some(info));

        let bad = ConnectOutcome::failed("no endpoint");
        assert!(!bad.success);
        assert_eq!(bad.error.as_deref(), Some("no endpoint"));
        assert!(bad.app_info.is_none());
    }
}
