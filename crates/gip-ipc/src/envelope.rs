use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

/// One protocol request. The `id` is caller-assigned and only needs to be
/// unique within a single connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            id,
            method: method.to_string(),
            params,
        }
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    pub fn param_bool(&self, key: &str, default: bool) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    pub fn param_u64(&self, key: &str, default: u64) -> u64 {
        self.params
            .get(key)
            .and_then(|v| v.as_u64())
            .unwrap_or(default)
    }
}

/// One protocol response: `result` or `error`, never both. Method-level
/// failures (a click on a disabled widget, an unresolvable ref) travel
/// inside `result` as `{"success": false, "error": ...}`; the top-level
/// `error` string is reserved for requests the server could not execute
/// at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, message: &str) -> Self {
        Self {
            id,
            result: None,
            error: Some(message.to_string()),
        }
    }

    pub fn action_success(id: u64) -> Self {
        Self::success(id, json!({ "success": true }))
    }

    pub fn action_failed(id: u64, message: &str) -> Self {
        Self::success(id, json!({ "success": false, "error": message }))
    }

    pub fn element_not_found(id: u64, element_ref: &str) -> Self {
        Self::action_failed(id, &format!("Widget not found: {}", element_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_roundtrip() {
        let request = Request::new(7, "click", json!({"ref": "root/submit"}));
        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: Request = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.method, "click");
        assert_eq!(decoded.param_str("ref"), Some("root/submit"));
    }

    #[test]
    fn test_request_params_default_to_null() {
        let decoded: Request = serde_json::from_str(r#"{"id":1,"method":"ping"}"#).unwrap();
        assert!(decoded.params.is_null());
        assert_eq!(decoded.param_str("ref"), None);
    }

    #[test]
    fn test_param_accessors_with_defaults() {
        let request = Request::new(1, "type", json!({"text": "hi", "submit": true}));
        assert_eq!(request.param_str("text"), Some("hi"));
        assert!(request.param_bool("submit", false));
        assert_eq!(request.param_u64("timeout", 5000), 5000);
    }

    #[test]
    fn test_success_response_omits_error_field() {
        let response = Response::success(3, json!({"status": "ok"}));
        let encoded = serde_json::to_string(&response).unwrap();
        assert!(encoded.contains("\"result\""));
        assert!(!encoded.contains("\"error\""));
    }

    #[test]
    fn test_failure_response_omits_result_field() {
        let response = Response::failure(3, "Unknown method: bogus");
        let encoded = serde_json::to_string(&response).unwrap();
        assert!(encoded.contains("\"error\""));
        assert!(!encoded.contains("\"result\""));
    }

    #[test]
    fn test_action_failed_rides_inside_result() {
        let response = Response::action_failed(9, "Widget not enabled");
        let result = response.result.unwrap();
        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("Widget not enabled"));
        assert!(response.error.is_none());
    }
}
