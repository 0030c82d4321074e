//! The `{success, data, message}` response envelope
//!
//! Every backend endpoint answers with this wrapper. The legacy backend
//! occasionally returns a bare JSON array instead; that shape is normalized
//! here, in exactly one place, so no call site ever branches on it.

use serde::Deserialize;
use serde_json::Value;

use super::errors::ApiError;

/// Decoded response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Decode a response body into the envelope.
    ///
    /// A bare array becomes a successful envelope wrapping it; an object is
    /// required to carry the `success` flag; anything else is a decode error.
    pub fn decode(body: &Value) -> Result<Envelope, ApiError> {
        match body {
            Value::Array(_) => Ok(Envelope {
                success: true,
                data: Some(body.clone()),
                message: None,
            }),
            Value::Object(map) if map.contains_key("success") => {
                serde_json::from_value(body.clone()).map_err(|e| ApiError::Decode(e.to_string()))
            }
            other => Err(ApiError::Decode(format!(
                "expected envelope or array, got {}",
                type_name(other)
            ))),
        }
    }

    /// Unwrap into the payload.
    ///
    /// `success:false` becomes a server error carrying the backend message
    /// verbatim.
    pub fn into_data(self) -> Result<Value, ApiError> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(ApiError::server_message(self.message))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_success_envelope() {
        let body = json!({"success": true, "data": [{"_id": "a1", "name": "Eid"}]});
        let data = Envelope::decode(&body).unwrap().into_data().unwrap();
        assert_eq!(data[0]["name"], "Eid");
    }

    #[test]
    fn test_decode_failure_carries_message_verbatim() {
        let body = json!({"success": false, "message": "নাম প্রয়োজন"});
        let err = Envelope::decode(&body).unwrap().into_data().unwrap_err();
        assert_eq!(err.to_string(), "নাম প্রয়োজন");
    }

    #[test]
    fn test_decode_failure_without_message_uses_fallback() {
        let body = json!({"success": false});
        let err = Envelope::decode(&body).unwrap().into_data().unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
    }

    #[test]
    fn test_bare_array_is_normalized() {
        let body = json!([{"_id": "a1"}, {"_id": "a2"}]);
        let env = Envelope::decode(&body).unwrap();
        assert!(env.success);
        let data = env.into_data().unwrap();
        assert_eq!(data.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unrecognized_shapes_are_rejected() {
        assert!(Envelope::decode(&json!("ok")).is_err());
        assert!(Envelope::decode(&json!(42)).is_err());
        assert!(Envelope::decode(&json!({"data": []})).is_err());
    }
}
