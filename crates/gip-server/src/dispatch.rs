//! Request execution against a backend.
//!
//! One exhaustive match over the typed method catalogue. Parse failures
//! become top-level error envelopes; action failures ride inside the
//! result payload so callers can branch on `success`.

use serde_json::json;
use tracing::debug;

use gip_core::RefPath;
use gip_ipc::Command;
use gip_ipc::Request;
use gip_ipc::Response;

use crate::backend::ActionError;
use crate::backend::UiBackend;

pub fn dispatch<B: UiBackend + ?Sized>(backend: &mut B, request: &Request) -> Response {
    let command = match Command::parse(&request.method, &request.params) {
        Ok(command) => command,
        Err(e) => return Response::failure(request.id, &e.to_string()),
    };
    debug!(id = request.id, method = command.method_name(), "dispatching");

    match command {
        Command::Ping => Response::success(request.id, json!({"status": "ok"})),

        Command::Snapshot => match serde_json::to_value(backend.snapshot()) {
            Ok(tree) => Response::success(request.id, tree),
            Err(e) => Response::failure(request.id, &format!("snapshot failed: {}", e)),
        },

        Command::Click {
            element_ref,
            button,
        } => match parse_path(&element_ref).and_then(|path| backend.click(&path, button)) {
            Ok(()) => Response::action_success(request.id),
            Err(e) => Response::action_failed(request.id, &e.to_string()),
        },

        Command::TypeText {
            element_ref,
            text,
            submit,
        } => match parse_path(&element_ref).and_then(|path| backend.type_text(&path, &text, submit))
        {
            Ok(()) => Response::action_success(request.id),
            Err(e) => Response::action_failed(request.id, &e.to_string()),
        },

        Command::Select {
            element_ref,
            target,
        } => match parse_path(&element_ref).and_then(|path| backend.select(&path, &target)) {
            Ok(selected) => {
                Response::success(request.id, json!({"success": true, "selected": selected}))
            }
            Err(e) => Response::action_failed(request.id, &e.to_string()),
        },

        Command::WaitFor {
            element_ref,
            condition,
            timeout_ms,
        } => match parse_path(&element_ref)
            .and_then(|path| backend.wait_for(&path, condition, timeout_ms))
        {
            Ok(()) => Response::action_success(request.id),
            Err(e) => Response::action_failed(request.id, &e.to_string()),
        },
    }
}

/// A ref that cannot even be parsed names nothing; report it the same
/// way as an unmatched segment.
fn parse_path(element_ref: &str) -> Result<RefPath, ActionError> {
    RefPath::parse(element_ref).map_err(|_| ActionError::NotFound(element_ref.to_string()))
}
