//! Entangle request context
//!
//! Lets code running anywhere inside a request handler reach that request's
//! transport handles without passing them down explicitly:
//!
//! ```rust
//! use entangle_context::ContextStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = ContextStore::new();
//!
//! async fn deeply_nested(store: &ContextStore<&'static str>) -> &'static str {
//!     *store.current().unwrap()
//! }
//!
//! let token = store.begin("GET /hello");
//! let seen = store.run(token, deeply_nested(&store)).await;
//! assert_eq!(seen, "GET /hello");
//! assert_eq!(store.active(), 0);
//! # }
//! ```
//!
//! The store is an ordinary value owned by whoever serves requests. Tokens
//! are random, so several stores can share a process.

mod error;
mod store;
mod token;

pub use error::{ContextError, Result};
pub use store::{current_token, ContextStore};
pub use token::Token;
