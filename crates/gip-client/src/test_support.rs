//! In-memory adapter for exercising the controller without a transport.

use serde_json::json;
use serde_json::Value;

use gip_core::mock_tree::MockTree;
use gip_core::snapshot_tree;
use gip_core::ElementNode;

use crate::adapter::AppInfo;
use crate::adapter::ConnectOutcome;
use crate::adapter::FrameworkAdapter;
use crate::error::ClientError;

/// Adapter backed by an owned widget tree. Connects to anything, records
/// actions as node properties, and reports `"mock"` as its framework.
pub struct MockAdapter {
    tree: MockTree,
    connected: bool,
    /// When set, the next connect attempt fails with this message.
    pub refuse_connect: Option<String>,
}

impl MockAdapter {
    pub fn new() -> Self {
        let mut tree = MockTree::new("Window");
        let button = tree.add_child(tree.root_id(), "Button");
        tree.set_name(button, "submit");
        let input = tree.add_child(tree.root_id(), "LineEdit");
        tree.set_name(input, "text_input");

        Self {
            tree,
            connected: false,
            refuse_connect: None,
        }
    }

    pub fn tree_mut(&mut self) -> &mut MockTree {
        &mut self.tree
    }

    fn apply(
        &mut self,
        element_ref: &str,
        action: impl FnOnce(&mut MockTree, gip_core::mock_tree::NodeId),
    ) -> Value {
        let resolved = gip_core::resolve_str(&self.tree.root(), element_ref).map(|n| n.id());
        match resolved {
            Ok(id) => {
                action(&mut self.tree, id);
                json!({"success": true})
            }
            Err(e) => json!({"success": false, "error": e.to_string()}),
        }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkAdapter for MockAdapter {
    fn framework_name(&self) -> &'static str {
        "mock"
    }

    fn connect(&mut self, target: &str) -> ConnectOutcome {
        if let Some(message) = self.refuse_connect.take() {
            return ConnectOutcome::failed(message);
        }
        self.connected = true;
        ConnectOutcome::connected(AppInfo {
            framework: self.framework_name().to_string(),
            transport: "in_memory".to_string(),
            target: target.to_string(),
        })
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn ping(&mut self) -> Result<Value, ClientError> {
        Ok(json!({"status": "ok"}))
    }

    fn snapshot(&mut self) -> Result<ElementNode, ClientError> {
        Ok(snapshot_tree(&self.tree.root()))
    }

    fn click(&mut self, element_ref: &str, _button: &str) -> Result<Value, ClientError> {
        Ok(self.apply(element_ref, |tree, id| {
            let clicks = tree
                .property(id, "clicks")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            tree.set_property(id, "clicks", json!(clicks + 1));
        }))
    }

    fn type_text(
        &mut self,
        element_ref: &str,
        text: &str,
        submit: bool,
    ) -> Result<Value, ClientError> {
        let text = text.to_string();
        Ok(self.apply(element_ref, |tree, id| {
            tree.set_property(id, "text", json!(text));
            if submit {
                tree.set_property(id, "submitted", json!(true));
            }
        }))
    }
}
