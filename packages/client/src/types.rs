use std::collections::HashMap;

use entangle_wire::Json;

/// One call, ready for the transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallRequest {
    /// Full URL of the procedure.
    pub url: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Encoded arguments: an array, or an object for post-body procedures
    pub body: Json,
}

impl CallRequest {
    pub fn new(url: impl Into<String>, body: Json) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// What came back.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body as JSON.
    /// None if the body was empty or not valid JSON.
    pub body: Option<Json>,

    /// Raw body, for reporting bodies that are not JSON.
    pub body_text: String,
}

impl CallResponse {
    pub fn new(status: u16, body: Json) -> Self {
        let body_text = body.to_string();
        Self {
            status,
            body: Some(body),
            body_text,
        }
    }

    /// A response as read off the wire, parsed if it is JSON.
    pub fn from_text(status: u16, body_text: impl Into<String>) -> Self {
        let body_text = body_text.into();
        Self {
            status,
            body: serde_json::from_str(&body_text).ok(),
            body_text,
        }
    }

    /// Any status of 300 and above is a failed call.
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}
