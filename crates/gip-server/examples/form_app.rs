//! Headless demo target. Builds a small form, starts the command
//! server, and pumps the task queue in place of a real GUI event loop.
//!
//! Drive it from another terminal with the `drive_form` example from
//! the client crate, or by hand:
//!
//! ```text
//! cargo run --example form_app
//! ```

use std::time::Duration;

use serde_json::json;

use gip_core::UiNode;
use gip_server::test_support::MockBackend;
use gip_server::CommandServer;
use gip_server::ServerError;

fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut backend = build_form();
    let (handle, queue) = CommandServer::start("gip_instrument")?;
    println!("form_app listening on {}", handle.endpoint().display());

    // A real application would drain the queue from its UI thread's
    // idle handler; here the pump loop is the whole event loop.
    loop {
        queue.process_one(&mut backend, Duration::from_millis(100));
    }
}

/// Form with one of each interactable widget plus labels that react to
/// clicks, so snapshots visibly change as a controller drives it.
fn build_form() -> MockBackend {
    let mut backend = MockBackend::form_app();
    let tree = backend.tree_mut();
    let root = tree.root_id();

    let copy_button = tree.add_child(root, "Button");
    tree.set_name(copy_button, "copy_button");

    let result_label = tree.add_child(root, "Label");
    tree.set_name(result_label, "result_label");
    tree.set_property(result_label, "text", json!(""));

    let counter_button = tree.add_child(root, "Button");
    tree.set_name(counter_button, "counter_button");
    tree.set_property(counter_button, "text", json!("Clicked 0 times"));

    let status_label = tree.add_child(root, "Label");
    tree.set_name(status_label, "checkbox_status");
    tree.set_property(status_label, "text", json!("Feature disabled"));

    backend.on_click(move |tree, clicked| {
        let name = tree.node(clicked).name();
        match name.as_deref() {
            // Copy the text input's content into the result label.
            Some("copy_button") => {
                let text = tree
                    .property(find_named(tree, "text_input"), "text")
                    .cloned()
                    .unwrap_or_else(|| json!(""));
                tree.set_property(result_label, "text", text);
            }
            Some("counter_button") => {
                let clicks = tree
                    .property(clicked, "clicks")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0);
                tree.set_property(clicked, "text", json!(format!("Clicked {} times", clicks)));
            }
            Some("feature_checkbox") => {
                let checked = tree
                    .property(clicked, "checked")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                let status = if checked {
                    "Feature enabled"
                } else {
                    "Feature disabled"
                };
                tree.set_property(status_label, "text", json!(status));
            }
            _ => {}
        }
    });

    backend
}

fn find_named(tree: &gip_core::mock_tree::MockTree, name: &str) -> gip_core::mock_tree::NodeId {
    tree.root()
        .children()
        .iter()
        .find(|child| child.name().as_deref() == Some(name))
        .map(|child| child.id())
        .unwrap_or_else(|| tree.root_id())
}
