//! Entangle: serve a tree of async functions over HTTP and call it from a
//! mirrored client-side tree, as if the functions were local.
//!
//! Dates survive the trip in both directions, and application errors
//! declared in the tree are rebuilt on the client as instances of the
//! matching local class, extra fields included.
//!
//! This crate bundles the layers:
//!
//! - [`wire`]: the value tree and its JSON encoding
//! - [`schema`]: trees, route paths, manifests and error classes
//! - [`context`]: per-request context lookup from anywhere in a call
//! - [`server`]: the axum router and dispatcher
//! - [`client`]: the proxy factory
//!
//! ```no_run
//! use entangle::server::{procedure, Args, ServeConfig, Service, ServiceBranch};
//! use entangle::client::{ClientConfig, Proxy};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = ServiceBranch::new()
//!     .with("hello", procedure(|_args: Args| async { Ok("Hello World!") }));
//! let service = Service::new(tree)?;
//!
//! // ship the manifest to clients however suits, then:
//! let manifest = service.manifest().clone();
//! let proxy = Proxy::new(&manifest, ClientConfig::new("http://localhost:8080/api")?)?;
//!
//! tokio::spawn(entangle::server::serve(service, ServeConfig::default()));
//! let _greeting = proxy.call("hello", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub use entangle_client as client;
pub use entangle_context as context;
pub use entangle_schema as schema;
pub use entangle_server as server;
pub use entangle_wire as wire;

pub use entangle_schema::{AppError, ErrorClass};
pub use entangle_wire::Value;
