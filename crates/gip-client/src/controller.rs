//! Connection owner and method router.
//!
//! The controller holds the registered adapters, tracks which one is
//! current, and converts every outcome into the response envelope
//! payload. Nothing an adapter or transport does propagates out as a
//! fault; callers always get a structured value back.

use std::collections::BTreeMap;

use serde_json::json;
use serde_json::Value;

use gip_ipc::Command;
use gip_ipc::SelectTarget;

use crate::adapter::FrameworkAdapter;
use crate::adapters::EmbeddedAdapter;
use crate::adapters::WebAdapter;
use crate::error::ClientError;
use tracing::info;
use tracing::warn;

const NOT_CONNECTED: &str = "Not connected to any application. Use connect() first.";

/// Single-flow by design: one logical command in flight at a time, so no
/// internal locking. Callers serialize access themselves.
pub struct Controller {
    adapters: BTreeMap<String, Box<dyn FrameworkAdapter>>,
    current: Option<String>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
            current: None,
        }
    }

    /// Controller with the built-in adapters registered.
    pub fn with_default_adapters() -> Self {
        let mut controller = Self::new();
        controller.register_adapter(Box::new(EmbeddedAdapter::new()));
        controller.register_adapter(Box::new(WebAdapter::new()));
        controller
    }

    /// Registers `adapter` under its framework name, replacing any
    /// previous registration for that name.
    pub fn register_adapter(&mut self, adapter: Box<dyn FrameworkAdapter>) {
        let name = adapter.framework_name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_some() {
            warn!(framework = %name, "replacing registered adapter");
        }
    }

    pub fn available_frameworks(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    pub fn is_connected(&self) -> bool {
        self.current_adapter()
            .map(|a| a.is_connected())
            .unwrap_or(false)
    }

    fn current_adapter(&self) -> Option<&dyn FrameworkAdapter> {
        self.current
            .as_ref()
            .and_then(|name| self.adapters.get(name))
            .map(|boxed| boxed.as_ref())
    }

    /// Connects to `target` through the adapter registered for
    /// `framework`. Any existing connection is torn down first, even if
    /// the new attempt then fails.
    pub fn connect(&mut self, framework: &str, target: &str) -> Value {
        if self.current.is_some() {
            self.disconnect();
        }

        let Some(adapter) = self.adapters.get_mut(framework) else {
            return json!({
                "success": false,
                "error": format!(
                    "Unknown framework: {}. Available frameworks: {}",
                    framework,
                    self.available_frameworks().join(", ")
                ),
            });
        };

        let outcome = adapter.connect(target);
        if outcome.success {
            info!(framework, target, "connected");
            self.current = Some(framework.to_string());
            json!({"success": true, "app_info": outcome.app_info})
        } else {
            json!({
                "success": false,
                "error": outcome.error.unwrap_or_else(|| "connect failed".to_string()),
            })
        }
    }

    /// Idempotent; disconnecting while already disconnected succeeds
    /// trivially.
    pub fn disconnect(&mut self) -> Value {
        if let Some(name) = self.current.take() {
            if let Some(adapter) = self.adapters.get_mut(&name) {
                adapter.disconnect();
            }
            info!(framework = %name, "disconnected");
        }
        json!({"success": true})
    }

    /// Current connection details for the outer command surface.
    pub fn status(&self) -> Value {
        let available = self.available_frameworks();
        match (&self.current, self.is_connected()) {
            (Some(framework), true) => json!({
                "connected": true,
                "framework": framework,
                "available_frameworks": available,
            }),
            _ => json!({"connected": false, "available_frameworks": available}),
        }
    }

    /// Routes one protocol call to the current adapter and returns the
    /// result payload. Unknown methods, bad parameters, missing
    /// connections, and transport failures all come back as structured
    /// error payloads.
    pub fn execute(&mut self, method: &str, params: &Value) -> Value {
        let command = match Command::parse(method, params) {
            Ok(command) => command,
            Err(e) => return json!({"error": e.to_string()}),
        };

        let Some(name) = self.current.clone() else {
            return error_payload(&command, NOT_CONNECTED);
        };
        let Some(adapter) = self.adapters.get_mut(&name) else {
            return error_payload(&command, NOT_CONNECTED);
        };
        if !adapter.is_connected() {
            return error_payload(&command, NOT_CONNECTED);
        }

        let result = match &command {
            Command::Ping => adapter.ping(),
            Command::Snapshot => adapter
                .snapshot()
                .and_then(|root| serde_json::to_value(root).map_err(ClientError::from)),
            Command::Click {
                element_ref,
                button,
            } => adapter.click(element_ref, button.as_str()),
            Command::TypeText {
                element_ref,
                text,
                submit,
            } => adapter.type_text(element_ref, text, *submit),
            Command::Select {
                element_ref,
                target,
            } => adapter.select(element_ref, select_params(target)),
            Command::WaitFor {
                element_ref,
                condition,
                timeout_ms,
            } => adapter.wait_for(element_ref, condition.as_str(), *timeout_ms),
        };

        match result {
            Ok(payload) => payload,
            Err(e) => error_payload(&command, &e.to_string()),
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}

/// Action methods report failure inside the result payload; query
/// methods have no success flag to carry, so theirs is a bare error.
fn error_payload(command: &Command, message: &str) -> Value {
    match command {
        Command::Ping | Command::Snapshot => json!({"error": message}),
        _ => json!({"success": false, "error": message}),
    }
}

fn select_params(target: &SelectTarget) -> Value {
    let mut params = serde_json::Map::new();
    if let Some(value) = &target.value {
        params.insert("value".to_string(), json!(value));
    }
    if let Some(index) = target.index {
        params.insert("index".to_string(), json!(index));
    }
    if let Some(text) = &target.text {
        params.insert("text".to_string(), json!(text));
    }
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::MockAdapter;

    fn connected_controller() -> Controller {
        let mut controller = Controller::new();
        controller.register_adapter(Box::new(MockAdapter::new()));
        let outcome = controller.connect("mock", "anything");
        assert_eq!(outcome["success"], json!(true));
        controller
    }

    #[test]
    fn test_unknown_framework_lists_available() {
        let mut controller = Controller::new();
        controller.register_adapter(Box::new(MockAdapter::new()));
        let outcome = controller.connect("gtk", "whatever");
        assert_eq!(outcome["success"], json!(false));
        let message = outcome["error"].as_str().unwrap();
        assert!(message.contains("Unknown framework: gtk"));
        assert!(message.contains("mock"));
    }

    #[test]
    fn test_execute_requires_connection() {
        let mut controller = Controller::new();
        let payload = controller.execute("click", &json!({"ref": "root/submit"}));
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"].as_str().unwrap().contains("connect()"));
    }

    #[test]
    fn test_unknown_method_is_reported_not_raised() {
        let mut controller = connected_controller();
        let payload = controller.execute("bogus", &json!({}));
        assert!(payload["error"].as_str().unwrap().contains("bogus"));
    }

    #[test]
    fn test_ping_routes_to_current_adapter() {
        let mut controller = connected_controller();
        let payload = controller.execute("ping", &json!({}));
        assert_eq!(payload["status"], json!("ok"));
    }

    #[test]
    fn test_snapshot_returns_tree_payload() {
        let mut controller = connected_controller();
        let payload = controller.execute("snapshot", &json!({}));
        assert_eq!(payload["ref"], json!("root"));
        assert!(payload["children"].is_array());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut controller = connected_controller();
        assert_eq!(controller.disconnect()["success"], json!(true));
        assert_eq!(controller.disconnect()["success"], json!(true));
        assert!(!controller.is_connected());
    }

    #[test]
    fn test_status_reflects_connection() {
        let mut controller = connected_controller();
        assert_eq!(controller.status()["connected"], json!(true));
        assert_eq!(controller.status()["framework"], json!("mock"));
        controller.disconnect();
        let status = controller.status();
        assert_eq!(status["connected"], json!(false));
        assert_eq!(status["available_frameworks"], json!(["mock"]));
    }

    #[test]
    fn test_reconnect_tears_down_previous_connection() {
        let mut controller = connected_controller();
        // Second connect attempt to a missing framework still drops the
        // old connection first.
        let outcome = controller.connect("gtk", "whatever");
        assert_eq!(outcome["success"], json!(false));
        assert!(!controller.is_connected());
    }

    #[test]
    fn test_replacing_adapter_keeps_single_registration() {
        let mut controller = Controller::new();
        controller.register_adapter(Box::new(MockAdapter::new()));
        controller.register_adapter(Box::new(MockAdapter::new()));
        assert_eq!(controller.available_frameworks(), vec!["mock".to_string()]);
    }
}
