//! Drives the `form_app` example from the server crate. Start that
//! first, then:
//!
//! ```text
//! cargo run --example drive_form
//! ```

use serde_json::json;

use gip_client::Controller;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut controller = Controller::with_default_adapters();

    let outcome = controller.connect("embedded", "gip_instrument");
    if outcome["success"] != json!(true) {
        eprintln!("connect failed: {}", outcome["error"]);
        eprintln!("start the target first: cargo run -p gip-server --example form_app");
        std::process::exit(1);
    }
    println!("connected: {}", outcome["app_info"]);

    let tree = controller.execute("snapshot", &json!({}));
    println!("snapshot has {} top-level widgets", tree["children"].as_array().map(Vec::len).unwrap_or(0));

    println!("typing into root/text_input");
    let result = controller.execute(
        "type",
        &json!({"ref": "root/text_input", "text": "Hello from drive_form", "submit": false}),
    );
    println!("  -> {}", result);

    println!("clicking root/copy_button");
    let result = controller.execute("click", &json!({"ref": "root/copy_button"}));
    println!("  -> {}", result);

    let tree = controller.execute("snapshot", &json!({}));
    if let Some(label) = find(&tree, "root/result_label") {
        println!("result_label now reads: {}", label["properties"]["text"]);
    }

    println!("toggling root/feature_checkbox");
    let result = controller.execute("click", &json!({"ref": "root/feature_checkbox"}));
    println!("  -> {}", result);

    let tree = controller.execute("snapshot", &json!({}));
    if let Some(status) = find(&tree, "root/checkbox_status") {
        println!("checkbox_status now reads: {}", status["properties"]["text"]);
    }

    controller.disconnect();
    println!("done");
}

fn find<'a>(tree: &'a serde_json::Value, element_ref: &str) -> Option<&'a serde_json::Value> {
    if tree["ref"] == json!(element_ref) {
        return Some(tree);
    }
    tree["children"]
        .as_array()?
        .iter()
        .find_map(|child| find(child, element_ref))
}
