//! Wire codec for GIP messages.
//!
//! Encoding is plain JSON text with no length prefix. The stream-socket
//! transports rely on the fact that a message is a single JSON object
//! with balanced delimiters: the decoder re-parses the receive buffer as
//! chunks arrive and reports `Incomplete` until the object closes. A
//! buffer that parses but is not shaped like a request or response is
//! rejected outright, never treated as "needs more bytes".

use serde_json::Value;

use crate::envelope::Request;
use crate::envelope::Response;
use crate::error::ProtocolError;

/// A fully decoded protocol message. The codec is shared by both sides of
/// the connection, so it classifies rather than assuming a direction.
#[derive(Debug)]
pub enum WireMessage {
    Request(Request),
    Response(Response),
}

/// Outcome of one decode attempt over the receive buffer.
#[derive(Debug)]
pub enum Decoded {
    /// One complete message; `consumed` bytes may be drained from the
    /// front of the buffer (trailing bytes belong to the next message).
    Message {
        message: WireMessage,
        consumed: usize,
    },
    /// Not enough bytes for a complete JSON object yet.
    Incomplete,
}

pub fn encode_request(request: &Request) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(request)?)
}

pub fn encode_response(response: &Response) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(response)?)
}

/// Attempt to decode one message from the front of `buffer`.
///
/// Returns `Incomplete` when the buffer ends mid-object, `Malformed` when
/// the bytes can never become valid JSON, and `UnexpectedShape` when a
/// value parsed cleanly but is not a request/response envelope.
pub fn decode(buffer: &[u8]) -> Result<Decoded, ProtocolError> {
    let mut stream = serde_json::Deserializer::from_slice(buffer).into_iter::<Value>();

    match stream.next() {
        None => Ok(Decoded::Incomplete),
        Some(Ok(value)) => {
            let consumed = stream.byte_offset();
            let message = classify(value)?;
            Ok(Decoded::Message { message, consumed })
        }
        Some(Err(e)) if e.is_eof() => Ok(Decoded::Incomplete),
        Some(Err(e)) => Err(ProtocolError::Malformed(e.to_string())),
    }
}

fn classify(value: Value) -> Result<WireMessage, ProtocolError> {
    let object = match value.as_object() {
        Some(o) => o,
        None => {
            return Err(ProtocolError::UnexpectedShape(
                "top-level JSON value is not an object".to_string(),
            ));
        }
    };

    if !object.get("id").map(Value::is_u64).unwrap_or(false) {
        return Err(ProtocolError::UnexpectedShape(
            "missing or non-integer 'id'".to_string(),
        ));
    }

    if object.contains_key("method") {
        let request: Request = serde_json::from_value(value)
            .map_err(|e| ProtocolError::UnexpectedShape(e.to_string()))?;
        return Ok(WireMessage::Request(request));
    }

    match (object.contains_key("result"), object.contains_key("error")) {
        (true, true) => Err(ProtocolError::UnexpectedShape(
            "response carries both 'result' and 'error'".to_string(),
        )),
        (false, false) => Err(ProtocolError::UnexpectedShape(
            "object has neither 'method', 'result' nor 'error'".to_string(),
        )),
        _ => {
            let response: Response = serde_json::from_value(value)
                .map_err(|e| ProtocolError::UnexpectedShape(e.to_string()))?;
            Ok(WireMessage::Response(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode_request(buffer: &[u8]) -> (Request, usize) {
        match decode(buffer) {
            Ok(Decoded::Message {
                message: WireMessage::Request(request),
                consumed,
            }) => (request, consumed),
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_complete_request() {
        let bytes = br#"{"id":1,"method":"snapshot","params":{}}"#;
        let (request, consumed) = decode_request(bytes);
        assert_eq!(request.method, "snapshot");
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_decode_complete_response() {
        let bytes = br#"{"id":4,"result":{"status":"ok"}}"#;
        match decode(bytes).unwrap() {
            Decoded::Message {
                message: WireMessage::Response(response),
                ..
            } => {
                assert_eq!(response.id, 4);
                assert_eq!(response.result, Some(json!({"status": "ok"})));
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_object_is_incomplete() {
        let bytes = br#"{"id":1,"method":"snap"#;
        assert!(matches!(decode(bytes).unwrap(), Decoded::Incomplete));
    }

    #[test]
    fn test_empty_buffer_is_incomplete() {
        assert!(matches!(decode(b"").unwrap(), Decoded::Incomplete));
    }

    #[test]
    fn test_single_byte_chunks_agree_with_whole_buffer() {
        let request = Request::new(42, "click", json!({"ref": "root/submit", "button": "left"}));
        let bytes = encode_request(&request).unwrap();

        // Whole-buffer decode.
        let (whole, whole_consumed) = decode_request(&bytes);

        // Feed 1 byte at a time: everything short of the full message must
        // come back Incomplete, and the final decode must agree.
        for end in 1..bytes.len() {
            assert!(
                matches!(decode(&bytes[..end]).unwrap(), Decoded::Incomplete),
                "prefix of {} bytes decoded early",
                end
            );
        }
        let (chunked, chunked_consumed) = decode_request(&bytes);
        assert_eq!(chunked.id, whole.id);
        assert_eq!(chunked.params, whole.params);
        assert_eq!(chunked_consumed, whole_consumed);
    }

    #[test]
    fn test_two_byte_chunks_agree_with_whole_buffer() {
        let request = Request::new(7, "type", json!({"ref": "root/text_input", "text": "ab"}));
        let bytes = encode_request(&request).unwrap();

        let mut seen = 0;
        while seen < bytes.len() {
            seen = (seen + 2).min(bytes.len());
            let outcome = decode(&bytes[..seen]).unwrap();
            if seen < bytes.len() {
                assert!(matches!(outcome, Decoded::Incomplete));
            } else {
                match outcome {
                    Decoded::Message { consumed, .. } => assert_eq!(consumed, bytes.len()),
                    Decoded::Incomplete => panic!("full buffer still incomplete"),
                }
            }
        }
    }

    #[test]
    fn test_consumed_excludes_trailing_bytes() {
        let first = encode_request(&Request::new(1, "ping", json!({}))).unwrap();
        let second = encode_request(&Request::new(2, "snapshot", json!({}))).unwrap();
        let mut buffer = first.clone();
        buffer.extend_from_slice(&second);

        let (request, consumed) = decode_request(&buffer);
        assert_eq!(request.id, 1);
        assert_eq!(consumed, first.len());

        let (request, _) = decode_request(&buffer[consumed..]);
        assert_eq!(request.id, 2);
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        assert!(matches!(
            decode(b"not json at all"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_non_object_value_is_rejected() {
        assert!(matches!(
            decode(b"[1,2,3]"),
            Err(ProtocolError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_object_without_envelope_fields_is_rejected() {
        assert!(matches!(
            decode(br#"{"id":1,"foo":"bar"}"#),
            Err(ProtocolError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_response_with_result_and_error_is_rejected() {
        assert!(matches!(
            decode(br#"{"id":1,"result":{},"error":"boom"}"#),
            Err(ProtocolError::UnexpectedShape(_))
        ));
    }
}
