//! Typed method catalogue.
//!
//! Every method the protocol supports is a `Command` variant; dispatch on
//! both sides is an exhaustive match over this enum, so an unknown method
//! name can only fail in one place: [`Command::parse`].

use serde_json::Value;
use thiserror::Error;

/// Method names accepted by [`Command::parse`], in catalogue order.
/// Quoted in unknown-method errors so callers can self-correct.
pub const METHOD_NAMES: &[&str] = &["ping", "snapshot", "click", "type", "select", "wait_for"];

const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Unrecognized names fall back to the left button, matching how the
    /// action side treats the parameter as advisory.
    pub fn from_param(name: Option<&str>) -> Self {
        match name {
            Some("right") => Self::Right,
            Some("middle") => Self::Middle,
            _ => Self::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    Visible,
    Hidden,
    Enabled,
    Disabled,
}

impl WaitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

/// What a `select` call should pick inside the addressed element. All
/// three selectors are optional on the wire; adapters decide which they
/// honor and in what priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectTarget {
    pub value: Option<String>,
    pub index: Option<usize>,
    pub text: Option<String>,
}

impl SelectTarget {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.index.is_none() && self.text.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Snapshot,
    Click {
        element_ref: String,
        button: MouseButton,
    },
    TypeText {
        element_ref: String,
        text: String,
        submit: bool,
    },
    Select {
        element_ref: String,
        target: SelectTarget,
    },
    WaitFor {
        element_ref: String,
        condition: WaitCondition,
        timeout_ms: u64,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown method: {method}. Available: {}", METHOD_NAMES.join(", "))]
    UnknownMethod { method: String },

    #[error("Invalid parameters for {method}: {detail}")]
    InvalidParams { method: String, detail: String },
}

impl Command {
    pub fn parse(method: &str, params: &Value) -> Result<Self, CommandError> {
        match method {
            "ping" => Ok(Self::Ping),
            "snapshot" => Ok(Self::Snapshot),
            "click" => Ok(Self::Click {
                element_ref: require_str(method, params, "ref")?,
                button: MouseButton::from_param(param_str(params, "button")),
            }),
            "type" => Ok(Self::TypeText {
                element_ref: require_str(method, params, "ref")?,
                text: require_str(method, params, "text")?,
                submit: param_bool(params, "submit"),
            }),
            "select" => {
                let target = SelectTarget {
                    value: param_str(params, "value").map(String::from),
                    index: params
                        .get("index")
                        .and_then(|v| v.as_u64())
                        .map(|n| n as usize),
                    text: param_str(params, "text").map(String::from),
                };
                Ok(Self::Select {
                    element_ref: require_str(method, params, "ref")?,
                    target,
                })
            }
            "wait_for" => {
                let condition = match param_str(params, "condition") {
                    None | Some("visible") => WaitCondition::Visible,
                    Some("hidden") => WaitCondition::Hidden,
                    Some("enabled") => WaitCondition::Enabled,
                    Some("disabled") => WaitCondition::Disabled,
                    Some(other) => {
                        return Err(CommandError::InvalidParams {
                            method: method.to_string(),
                            detail: format!("unknown condition '{}'", other),
                        });
                    }
                };
                Ok(Self::WaitFor {
                    element_ref: require_str(method, params, "ref")?,
                    condition,
                    timeout_ms: params
                        .get("timeout")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(DEFAULT_WAIT_TIMEOUT_MS),
                })
            }
            other => Err(CommandError::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Snapshot => "snapshot",
            Self::Click { .. } => "click",
            Self::TypeText { .. } => "type",
            Self::Select { .. } => "select",
            Self::WaitFor { .. } => "wait_for",
        }
    }
}

fn param_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn param_bool(params: &Value, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn require_str(method: &str, params: &Value, key: &str) -> Result<String, CommandError> {
    param_str(params, key)
        .map(String::from)
        .ok_or_else(|| CommandError::InvalidParams {
            method: method.to_string(),
            detail: format!("missing '{}' param", key),
        })
}
