//! Seam between the protocol and the hosting application's UI tree.

use serde_json::Value;
use thiserror::Error;

use gip_core::ElementNode;
use gip_core::RefPath;
use gip_core::ResolveError;
use gip_ipc::MouseButton;
use gip_ipc::SelectTarget;
use gip_ipc::WaitCondition;

/// Why an action method could not be carried out. These travel inside
/// the result payload as `{"success": false, "error": ...}`; none of
/// them are connection-level faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Widget not found: {0}")]
    NotFound(String),

    #[error("Widget not visible")]
    NotVisible,

    #[error("Widget not enabled")]
    NotEnabled,

    #[error("{operation} not implemented for {framework}")]
    NotImplemented {
        operation: &'static str,
        framework: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl From<ResolveError> for ActionError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound(element_ref) => Self::NotFound(element_ref),
            ResolveError::BadRef(e) => Self::Failed(e.to_string()),
        }
    }
}

/// What the hosting application exposes to the server. Implementations
/// run exclusively on the UI-owning thread; the dispatcher never calls
/// them from anywhere else.
///
/// `select` and `wait_for` are optional capabilities with defaults that
/// report the operation as unsupported for this backend's framework.
pub trait UiBackend {
    /// Stable lowercase identifier quoted in unsupported-operation
    /// errors.
    fn framework_name(&self) -> &'static str;

    /// Snapshot of the whole live tree, refs included.
    fn snapshot(&mut self) -> ElementNode;

    fn click(&mut self, path: &RefPath, button: MouseButton) -> Result<(), ActionError>;

    fn type_text(&mut self, path: &RefPath, text: &str, submit: bool) -> Result<(), ActionError>;

    /// On success, returns the selected value for the result payload.
    fn select(&mut self, _path: &RefPath, _target: &SelectTarget) -> Result<Value, ActionError> {
        Err(ActionError::NotImplemented {
            operation: "select",
            framework: self.framework_name().to_string(),
        })
    }

    fn wait_for(
        &mut self,
        _path: &RefPath,
        _condition: WaitCondition,
        _timeout_ms: u64,
    ) -> Result<(), ActionError> {
        Err(ActionError::NotImplemented {
            operation: "wait_for",
            framework: self.framework_name().to_string(),
        })
    }
}
