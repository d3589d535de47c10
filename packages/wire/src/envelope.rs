//! Response envelopes.
//!
//! A successful call answers with the encoded result. Results that are not
//! maps are wrapped as `{"response": value}` so the body is always an object.
//! A failed call answers with an [`ErrorBody`]:
//!
//! ```text
//! {"error": "<short code or registered path>", "message": "...", ...fields}
//! ```

use std::collections::BTreeMap;

use serde_json::Map;

use crate::codec::{decode, encode};
use crate::{CodecError, Json, Value};

/// Key wrapping non-map results.
pub const RESPONSE_KEY: &str = "response";

const ERROR_KEY: &str = "error";
const MESSAGE_KEY: &str = "message";
const STACK_KEY: &str = "stack";

/// Build the success body for a call result.
pub fn success_body(result: &Value) -> Result<Json, CodecError> {
    match result {
        Value::Map(_) => encode(result),
        other => {
            let mut body = Map::new();
            body.insert(RESPONSE_KEY.to_string(), encode(other)?);
            Ok(Json::Object(body))
        }
    }
}

/// Turn a success body back into the call result.
///
/// The inverse of [`success_body`]: a `response` key is unwrapped, any other
/// body is the result itself.
pub fn unwrap_success(body: Json) -> Value {
    match decode(body) {
        Value::Map(mut map) if map.contains_key(RESPONSE_KEY) => {
            map.remove(RESPONSE_KEY).unwrap_or_default()
        }
        other => other,
    }
}

/// The body of a failed call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    /// Short code (`bad_input`) or registered error path (`/errors/specialerror`).
    pub error: String,

    /// Human readable message.
    pub message: String,

    /// Cause chain of an unexpected failure, outermost first.
    pub stack: Vec<String>,

    /// Additional fields of the error instance.
    pub fields: BTreeMap<String, Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_stack(mut self, stack: Vec<String>) -> Self {
        self.stack = stack;
        self
    }

    /// Encode for the wire.
    ///
    /// Fields named like the reserved keys are dropped; the reserved keys win.
    pub fn to_json(&self) -> Result<Json, CodecError> {
        let mut body = Map::new();

        for (name, value) in &self.fields {
            if is_reserved(name) {
                continue;
            }
            if let Some(encoded) = encode_field(value)? {
                body.insert(name.clone(), encoded);
            }
        }

        body.insert(ERROR_KEY.to_string(), Json::String(self.error.clone()));
        body.insert(MESSAGE_KEY.to_string(), Json::String(self.message.clone()));
        if !self.stack.is_empty() {
            body.insert(
                STACK_KEY.to_string(),
                Json::Array(self.stack.iter().cloned().map(Json::String).collect()),
            );
        }

        Ok(Json::Object(body))
    }

    /// Parse an error body received from the wire.
    pub fn from_json(json: Json) -> Result<Self, CodecError> {
        let Json::Object(mut body) = json else {
            return Err(CodecError::MalformedEnvelope {
                message: "error body is not an object".to_string(),
            });
        };

        let error = match body.remove(ERROR_KEY) {
            Some(Json::String(error)) => error,
            _ => {
                return Err(CodecError::MalformedEnvelope {
                    message: "error body has no string `error` field".to_string(),
                })
            }
        };

        let message = match body.remove(MESSAGE_KEY) {
            Some(Json::String(message)) => message,
            _ => String::new(),
        };

        let stack = match body.remove(STACK_KEY) {
            Some(Json::Array(lines)) => lines
                .into_iter()
                .filter_map(|line| match line {
                    Json::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(Json::String(line)) => line.lines().map(str::to_string).collect(),
            _ => Vec::new(),
        };

        let fields = body.into_iter().map(|(k, v)| (k, decode(v))).collect();

        Ok(Self {
            error,
            message,
            stack,
            fields,
        })
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(name, ERROR_KEY | MESSAGE_KEY | STACK_KEY)
}

fn encode_field(value: &Value) -> Result<Option<Json>, CodecError> {
    if matches!(value, Value::Function(_)) {
        return Ok(None);
    }
    encode(value).map(Some)
}
