//! Request body encoding and response body decoding.
//!
//! Encoding picks the content type from the body's form: structured values
//! serialize to JSON, strings pass through as already form-encoded text.
//! Decoding is lenient by contract: any response body that fails to parse
//! as JSON is returned as raw text, and an absent or empty body decodes to
//! `Value::Null`, so the dispatcher can always resolve a success response.

use serde_json::Value;

use crate::error::{Error, Result};

/// Content type for JSON-encoded bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type for pre-encoded form bodies.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A request body prior to encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured value, serialized to JSON at encode time.
    Json(Value),
    /// Pre-encoded `application/x-www-form-urlencoded` text, passed through
    /// verbatim.
    Form(String),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Form(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Form(text.to_owned())
    }
}

/// An encoded request body with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    /// The wire text.
    pub text: String,
    /// Value for the `Content-Type` header.
    pub content_type: &'static str,
}

impl EncodedBody {
    /// Byte length of the wire text, for the `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.text.len()
    }
}

/// Encodes a request body, selecting the content type from its form.
///
/// # Errors
///
/// Returns [`Error::Encode`] if a [`Body::Json`] value cannot be
/// serialized.
pub fn encode(body: &Body) -> Result<EncodedBody> {
    match body {
        Body::Json(value) => Ok(EncodedBody {
            text: serde_json::to_string(value).map_err(Error::Encode)?,
            content_type: CONTENT_TYPE_JSON,
        }),
        Body::Form(text) => Ok(EncodedBody {
            text: text.clone(),
            content_type: CONTENT_TYPE_FORM,
        }),
    }
}

/// Decodes a raw response body. Never fails.
///
/// Absent or empty input decodes to `Value::Null`; input that is not valid
/// JSON is returned unchanged as `Value::String`.
pub fn decode(raw: Option<&str>) -> Value {
    match raw {
        None => Value::Null,
        Some(text) if text.is_empty() => Value::Null,
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_encodes_with_json_content_type() {
        let body = Body::Json(json!({"name": "general", "position": 2}));
        let encoded = encode(&body).unwrap();
        assert_eq!(encoded.content_type, CONTENT_TYPE_JSON);
        assert_eq!(encoded.content_length(), encoded.text.len());
        assert_eq!(
            serde_json::from_str::<Value>(&encoded.text).unwrap(),
            json!({"name": "general", "position": 2})
        );
    }

    #[test]
    fn form_body_passes_through_with_form_content_type() {
        let body = Body::from("grant_type=authorization_code&code=abc");
        let encoded = encode(&body).unwrap();
        assert_eq!(encoded.content_type, CONTENT_TYPE_FORM);
        assert_eq!(encoded.text, "grant_type=authorization_code&code=abc");
        assert_eq!(encoded.content_length(), 38);
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let body = Body::Form("emoji=\u{1f980}".to_string());
        let encoded = encode(&body).unwrap();
        assert_eq!(encoded.content_length(), 10);
    }

    #[test]
    fn decode_absent_and_empty_yield_null() {
        assert_eq!(decode(None), Value::Null);
        assert_eq!(decode(Some("")), Value::Null);
    }

    #[test]
    fn decode_non_json_returns_raw_text() {
        assert_eq!(
            decode(Some("upstream proxy error")),
            Value::String("upstream proxy error".to_string())
        );
    }

    #[test]
    fn decode_json_parses() {
        assert_eq!(
            decode(Some(r#"{"id": "1012"}"#)),
            json!({"id": "1012"})
        );
    }

    #[test]
    fn encode_then_decode_round_trips_json() {
        let value = json!({
            "content": "hello",
            "tts": false,
            "embeds": [{"title": "t", "fields": []}],
        });
        let encoded = encode(&Body::Json(value.clone())).unwrap();
        assert_eq!(decode(Some(&encoded.text)), value);
    }
}
