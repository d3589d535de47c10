//! # entangle-client
//!
//! Call the procedures of a remote Entangle service as local async
//! functions.
//!
//! A [`Proxy`] is built from the service's manifest. It mirrors the
//! service tree: every callable becomes a [`RemoteFunction`] at the path the
//! server routes it at, and every declared error type becomes a local
//! [`ErrorClass`] that failed calls are reconstructed into.
//!
//! ```no_run
//! use entangle_client::{ClientConfig, Proxy, Value};
//!
//! # async fn run() -> entangle_client::Result<()> {
//! let manifest = serde_json::json!({
//!     "greetings": {"default": [1, ["name"]]},
//!     "errors": {"SpecialError": [2]},
//! });
//! let config = ClientConfig::new("http://localhost:8080/api")?;
//! let proxy = Proxy::from_json(manifest, config)?;
//!
//! match proxy.call("greetings", vec![Value::from("Ada")]).await {
//!     Ok(greeting) => println!("{:?}", greeting),
//!     Err(err) => {
//!         let special = proxy.error_class("errors/SpecialError");
//!         if let (Some(app), Some(special)) = (err.app_error(), special) {
//!             assert!(app.is(special));
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Requests go through a [`Transport`]; [`ReqwestTransport`] is used unless
//! another is given to [`Proxy::with_transport`].

pub mod config;
pub mod error;
pub mod proxy;
pub mod transport;
pub mod types;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use proxy::{Proxy, RemoteFunction};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CallRequest, CallResponse};

pub use entangle_schema::{AppError, ErrorClass, Manifest};
pub use entangle_wire::Value;
