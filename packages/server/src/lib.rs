//! Entangle server
//!
//! Serves a tree of async procedures over HTTP. Every callable gets a POST
//! route derived from its position in the tree; arguments arrive as a JSON
//! array, results leave as a JSON object.
//!
//! ```rust,no_run
//! use entangle_server::{procedure, serve, Args, ServeConfig, Service, ServiceBranch};
//!
//! # async fn run() -> entangle_server::Result<()> {
//! let tree = ServiceBranch::new()
//!     .with("hello", procedure(|_args: Args| async { Ok("Hello World!") }));
//!
//! // POST /api/hello  []  ->  200 {"response": "Hello World!"}
//! serve(Service::new(tree)?, ServeConfig::from_env()?).await
//! # }
//! ```
//!
//! # Failures
//!
//! A procedure fails with a [`CallError`]:
//! - [`RestError`]: fixed status and short code, e.g. `bad_input` (400)
//! - an [`AppError`]: an instance of a declared error type, answered with
//!   the class status and the path the type was declared at
//! - anything else, panics included: 500 `internal_error` with the cause
//!   chain as `stack`
//!
//! # Request context
//!
//! Each call runs inside a scope of the service's [`Contexts`] store, so
//! code anywhere below a procedure can reach the request with
//! `contexts.current()`.

mod config;
mod context;
mod dispatch;
mod error;
mod procedure;
mod serve;
mod service;

pub use config::{ServeConfig, BASE_URL_VAR, PORT_VAR};
pub use context::{Contexts, RequestContext, ResponseHandle};
pub use dispatch::{INTERNAL_ERROR, PAYLOAD_TOO_LARGE, SERIALIZE_ERROR};
pub use error::{CallError, Error, RestError, Result};
pub use procedure::{procedure, Args, FnProcedure, Procedure, ServiceNode};
pub use serve::{app, serve, serve_listener};
pub use service::{Service, ServiceBranch};

pub use entangle_schema::{AppError, ErrorClass};
