//! Entangle schema model
//!
//! A service is a tree: callables and declared error types as leaves, named
//! branches in between. This crate turns such a tree into routes.
//!
//! - [`Node`] / [`Branch`]: the tree, generic over its leaf payloads
//! - [`compile`]: derives one [`Route`] per leaf, with [`RoutePath`]s that
//!   client and server derive identically
//! - [`Manifest`]: the tree as clients receive it, with its JSON format
//! - [`ErrorClass`] / [`AppError`] / [`ErrorRegistry`]: declared error types,
//!   their instances, and the path each one is known by on the wire
//!
//! # Example
//!
//! ```rust
//! use entangle_schema::{compile, Branch, CallableSpec, ErrorSpec, Manifest};
//!
//! let manifest: Manifest = Branch::new()
//!     .callable("hello", CallableSpec::asynchronous(Vec::<String>::new()))
//!     .with(
//!         "errors",
//!         Branch::new().error_type("SpecialError", ErrorSpec::new("SpecialError")),
//!     )
//!     .into();
//!
//! let schema = compile(&manifest).unwrap();
//! let paths: Vec<_> = schema.routes().iter().map(|r| r.path.to_string()).collect();
//! assert_eq!(paths, vec!["/hello", "/errors/specialerror"]);
//! ```

mod class;
mod compile;
mod error;
mod manifest;
mod node;
mod path;
mod registry;

pub use class::{AppError, ErrorClass, DEFAULT_STATUS};
pub use compile::{compile, CompiledSchema, Route, Target};
pub use error::{Result, SchemaError};
pub use node::{Branch, CallKind, CallableSpec, ErrorSpec, Manifest, Node, DEFAULT_ENTRY};
pub use path::RoutePath;
pub use registry::{ErrorLeaf, ErrorRegistry, BASE_ERROR};
