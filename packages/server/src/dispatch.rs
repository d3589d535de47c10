//! Per-request dispatch: body in, procedure call, envelope out.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use entangle_schema::{CallKind, ErrorRegistry, RoutePath};
use entangle_wire::{decode, success_body, ErrorBody, Json, Value};
use futures::{FutureExt, StreamExt};

use crate::context::{Contexts, RequestContext, ResponseHandle};
use crate::error::{CallError, Panicked, RestError};
use crate::procedure::{Args, Procedure};

/// Code of failures that are neither declared nor expected.
pub const INTERNAL_ERROR: &str = "internal_error";

/// Code of results that could not be encoded.
pub const SERIALIZE_ERROR: &str = "serialize_error";

/// Code of request bodies over the configured limit.
pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";

/// Serves one route.
pub(crate) struct Dispatcher {
    pub path: RoutePath,
    pub procedure: Arc<dyn Procedure>,
    pub kind: CallKind,
    pub errors: Arc<ErrorRegistry>,
    pub contexts: Contexts,
    pub body_limit: usize,
}

impl Dispatcher {
    pub async fn handle(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();

        let args = match self.read_args(body).await {
            Ok(args) => args,
            Err(err) => {
                tracing::debug!(path = %self.path, error = %err, "rejected request body");
                return rest_response(&err);
            }
        };

        let handle = ResponseHandle::new();
        let context = RequestContext::new(parts, handle.clone());

        let call = AssertUnwindSafe(self.procedure.call(args)).catch_unwind();
        let outcome = match self.contexts.enter(context, call).await {
            Ok(result) => result,
            Err(payload) => Err(CallError::unexpected(Panicked(panic_message(payload)))),
        };

        let response = match outcome {
            Ok(value) => self.success(&value),
            Err(err) => self.failure(err),
        };

        let response = handle.finish(response);
        tracing::debug!(path = %self.path, status = %response.status(), "dispatched call");
        response
    }

    /// Steps 1 and 2: read, validate and decode the body.
    async fn read_args(&self, body: Body) -> Result<Args, RestError> {
        let bytes = read_limited(body, self.body_limit).await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Args::default());
        }

        let json: Json = serde_json::from_slice(&bytes)
            .map_err(|_| RestError::bad_input("Malformed JSON body"))?;

        match json {
            Json::Null => Ok(Args::default()),
            Json::Array(_) => match decode(json) {
                Value::Array(values) => Ok(Args::new(values)),
                _ => Err(RestError::bad_input("POST body must be an array")),
            },
            Json::Object(_) if self.kind == CallKind::PostBody => {
                Ok(Args::new(vec![decode(json)]))
            }
            _ => Err(RestError::bad_input("POST body must be an array")),
        }
    }

    fn success(&self, value: &Value) -> Response {
        match success_body(value) {
            Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
            Err(err) => {
                tracing::error!(path = %self.path, error = %err, "result could not be serialized");
                rest_response(
                    &RestError::internal("Resource returned data which could not be serialized")
                        .with_code(SERIALIZE_ERROR),
                )
            }
        }
    }

    fn failure(&self, err: CallError) -> Response {
        match err {
            CallError::Rest(err) => rest_response(&err),
            CallError::App(err) => match self.errors.identify(&err) {
                Some(path) => {
                    let mut body = ErrorBody::new(path.to_string(), err.message());
                    body.fields = err.fields().clone();
                    json_response(status_of(err.status()), &body)
                }
                None => {
                    tracing::warn!(
                        path = %self.path,
                        class = err.name(),
                        "procedure failed with an unregistered error type"
                    );
                    let mut body = ErrorBody::new(INTERNAL_ERROR, err.to_string());
                    body.fields = err.fields().clone();
                    json_response(StatusCode::INTERNAL_SERVER_ERROR, &body)
                }
            },
            CallError::Unexpected(err) => {
                let stack = cause_chain(&*err);
                tracing::error!(path = %self.path, error = %err, stack = ?stack, "procedure failed");
                let body = ErrorBody::new(INTERNAL_ERROR, err.to_string()).with_stack(stack);
                json_response(StatusCode::INTERNAL_SERVER_ERROR, &body)
            }
        }
    }
}

/// Collect a body of at most `limit` bytes.
///
/// Only an oversized body is `payload_too_large`; a stream that fails for
/// any other reason is bad input.
async fn read_limited(body: Body, limit: usize) -> Result<Vec<u8>, RestError> {
    let mut stream = body.into_data_stream();
    let mut bytes = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            RestError::bad_input(format!("Request body could not be read: {}", err))
        })?;
        if bytes.len() + chunk.len() > limit {
            return Err(RestError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                PAYLOAD_TOO_LARGE,
                format!("Request body exceeds {} bytes", limit),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn rest_response(err: &RestError) -> Response {
    json_response(err.status, &ErrorBody::new(err.code.clone(), err.message.clone()))
}

fn json_response(status: StatusCode, body: &ErrorBody) -> Response {
    match body.to_json() {
        Ok(json) => (status, axum::Json(json)).into_response(),
        Err(err) => {
            // An extra field could not be encoded; the code and message still can
            tracing::error!(error = %err, code = %body.error, "error body could not be serialized");
            let bare = ErrorBody::new(body.error.clone(), body.message.clone());
            let json = bare.to_json().unwrap_or(Json::Null);
            (status, axum::Json(json)).into_response()
        }
    }
}

fn status_of(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// The error and its sources, outermost first.
fn cause_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
