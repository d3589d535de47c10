//! What a procedure can reach of the request it serves.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use entangle_context::ContextStore;
use entangle_wire::Json;

/// Store of the requests a service is currently handling.
pub type Contexts = ContextStore<RequestContext>;

/// Transport handles of one request.
#[derive(Debug)]
pub struct RequestContext {
    /// Method, URI, headers and extensions of the request.
    pub parts: Parts,
    /// Write access to the response.
    pub response: ResponseHandle,
}

impl RequestContext {
    pub fn new(parts: Parts, response: ResponseHandle) -> Self {
        Self { parts, response }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// A request header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Write-once access to a request's response.
///
/// Handler code may answer the request itself; the first response written
/// wins and the dispatcher's own result is discarded. Headers added here
/// are applied to whichever response is finally sent.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    state: Arc<Mutex<ResponseState>>,
}

#[derive(Debug, Default)]
struct ResponseState {
    headers: HeaderMap,
    sent: Option<Response>,
}

impl ResponseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header to the eventual response.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().headers.insert(name, value);
    }

    /// Answer with a JSON body. Returns `false` when a response was already
    /// sent, in which case nothing changes.
    pub fn send_json(&self, status: StatusCode, body: Json) -> bool {
        self.send((status, axum::Json(body)).into_response())
    }

    /// Answer with an arbitrary response. Returns `false` when a response
    /// was already sent.
    pub fn send(&self, response: Response) -> bool {
        let mut state = self.lock();
        if state.sent.is_some() {
            tracing::debug!("response already sent, ignoring write");
            return false;
        }
        state.sent = Some(response);
        true
    }

    pub fn is_sent(&self) -> bool {
        self.lock().sent.is_some()
    }

    /// The response to send: the one written through the handle if any,
    /// else `fallback`, with the collected headers applied.
    pub(crate) fn finish(&self, fallback: Response) -> Response {
        let mut state = self.lock();
        let mut response = state.sent.take().unwrap_or(fallback);
        let headers = std::mem::take(&mut state.headers);
        response.headers_mut().extend(headers);
        response
    }

    fn lock(&self) -> MutexGuard<'_, ResponseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
