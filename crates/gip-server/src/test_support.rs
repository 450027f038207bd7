//! Backend over an owned widget tree, for tests and demo targets.

use serde_json::json;
use serde_json::Value;

use gip_core::mock_tree::MockTree;
use gip_core::mock_tree::NodeId;
use gip_core::resolve_ref;
use gip_core::snapshot_tree;
use gip_core::ElementNode;
use gip_core::RefPath;
use gip_ipc::MouseButton;
use gip_ipc::SelectTarget;

use crate::backend::ActionError;
use crate::backend::UiBackend;

type ClickHandler = Box<dyn FnMut(&mut MockTree, NodeId) + Send>;

/// In-memory [`UiBackend`]. Clicks and typed text land as node
/// properties so tests can observe them through fresh snapshots, and an
/// optional click handler lets a demo app wire real behavior to its
/// buttons. `wait_for` keeps the unsupported default.
pub struct MockBackend {
    tree: MockTree,
    click_handler: Option<ClickHandler>,
    panic_on_click: bool,
}

impl MockBackend {
    pub fn new(tree: MockTree) -> Self {
        Self {
            tree,
            click_handler: None,
            panic_on_click: false,
        }
    }

    /// The form every scenario test drives: a submit button, a text
    /// input, and a checkbox with stable names, plus a dropdown.
    pub fn form_app() -> Self {
        let mut tree = MockTree::new("Window");
        let root = tree.root_id();

        let submit = tree.add_child(root, "Button");
        tree.set_name(submit, "submit");

        let input = tree.add_child(root, "LineEdit");
        tree.set_name(input, "text_input");
        tree.set_property(input, "text", json!(""));

        let checkbox = tree.add_child(root, "Checkbox");
        tree.set_name(checkbox, "feature_checkbox");
        tree.set_property(checkbox, "checked", json!(false));

        let combo = tree.add_child(root, "ComboBox");
        tree.set_name(combo, "mode_select");
        tree.set_property(combo, "options", json!(["fast", "slow", "manual"]));
        tree.set_property(combo, "selected", json!("fast"));

        Self::new(tree)
    }

    pub fn tree(&self) -> &MockTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut MockTree {
        &mut self.tree
    }

    /// Run `handler` after every successful click, with the clicked
    /// node's id.
    pub fn on_click(&mut self, handler: impl FnMut(&mut MockTree, NodeId) + Send + 'static) {
        self.click_handler = Some(Box::new(handler));
    }

    pub fn panic_on_click(&mut self) {
        self.panic_on_click = true;
    }

    /// Disable the node at `element_ref`. Panics on a bad ref; test
    /// setup only.
    pub fn disable(&mut self, element_ref: &str) {
        let id = gip_core::resolve_str(&self.tree.root(), element_ref)
            .map(|n| n.id())
            .expect("setup ref must resolve");
        self.tree.set_enabled(id, false);
    }

    fn resolve(&self, path: &RefPath) -> Result<NodeId, ActionError> {
        resolve_ref(&self.tree.root(), path)
            .map(|node| node.id())
            .map_err(ActionError::from)
    }

    /// Visibility gates enabledness, matching how a user interacts with
    /// a real widget.
    fn check_interactable(&self, id: NodeId) -> Result<(), ActionError> {
        let node = self.tree.node(id);
        use gip_core::UiNode;
        if !node.visible() {
            return Err(ActionError::NotVisible);
        }
        if !node.enabled() {
            return Err(ActionError::NotEnabled);
        }
        Ok(())
    }
}

impl UiBackend for MockBackend {
    fn framework_name(&self) -> &'static str {
        "mock"
    }

    fn snapshot(&mut self) -> ElementNode {
        snapshot_tree(&self.tree.root())
    }

    fn click(&mut self, path: &RefPath, _button: MouseButton) -> Result<(), ActionError> {
        let id = self.resolve(path)?;
        self.check_interactable(id)?;
        if self.panic_on_click {
            panic!("click handler exploded");
        }

        use gip_core::UiNode;
        let type_name = self.tree.node(id).type_name();
        match type_name.as_str() {
            "Button" => {
                let clicks = self
                    .tree
                    .property(id, "clicks")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                self.tree.set_property(id, "clicks", json!(clicks + 1));
            }
            "Checkbox" => {
                let checked = self
                    .tree
                    .property(id, "checked")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                self.tree.set_property(id, "checked", json!(!checked));
            }
            _ => {}
        }

        if let Some(mut handler) = self.click_handler.take() {
            handler(&mut self.tree, id);
            self.click_handler = Some(handler);
        }
        Ok(())
    }

    fn type_text(&mut self, path: &RefPath, text: &str, submit: bool) -> Result<(), ActionError> {
        let id = self.resolve(path)?;
        self.check_interactable(id)?;
        self.tree.set_property(id, "text", json!(text));
        if submit {
            self.tree.set_property(id, "submitted", json!(true));
        }
        Ok(())
    }

    fn select(&mut self, path: &RefPath, target: &SelectTarget) -> Result<Value, ActionError> {
        let id = self.resolve(path)?;
        self.check_interactable(id)?;

        let options: Vec<String> = self
            .tree
            .property(id, "options")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        if options.is_empty() {
            return Err(ActionError::Failed("Widget has no options".to_string()));
        }

        let chosen = if let Some(value) = &target.value {
            options.iter().find(|o| *o == value)
        } else if let Some(index) = target.index {
            options.get(index)
        } else if let Some(text) = &target.text {
            options.iter().find(|o| *o == text)
        } else {
            return Err(ActionError::Failed(
                "select needs one of value, index or text".to_string(),
            ));
        };

        match chosen {
            Some(option) => {
                let selected = json!(option);
                self.tree.set_property(id, "selected", selected.clone());
                Ok(selected)
            }
            None => Err(ActionError::Failed("Option not found".to_string())),
        }
    }
}
