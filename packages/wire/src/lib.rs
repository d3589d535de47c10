//! Entangle wire layer
//!
//! Everything that crosses the network between a service and its proxies
//! passes through this crate:
//! - `Value`: the dynamically typed tree arguments and results are made of
//! - `encode` / `decode`: the codec between `Value` and JSON
//! - `ErrorBody` and the success envelope helpers
//! - `to_value` / `from_value`: serde bridges for typed data
//!
//! # Date tags
//!
//! JSON has no date type, so a `Value::Date` travels as a string of the form
//! `<epoch-millis>Z` (`1700000000000Z`). Ordinary strings that happen to look
//! like a tag are escaped with a leading `~` on encode and unescaped on decode,
//! so no user string is ever mistaken for a date.
//!
//! # Example
//!
//! ```rust
//! use chrono::DateTime;
//! use entangle_wire::{decode, encode, Value};
//!
//! let date = Value::Date(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
//! let json = encode(&date).unwrap();
//! assert_eq!(json, serde_json::json!("1700000000000Z"));
//! assert_eq!(decode(json), date);
//! ```

mod codec;
mod convert;
mod envelope;
mod error;
mod value;

pub use codec::{decode, encode, ESCAPE_PREFIX};
pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use envelope::{success_body, unwrap_success, ErrorBody, RESPONSE_KEY};
pub use error::CodecError;
pub use value::Value;

/// JSON as it appears on the wire.
pub type Json = serde_json::Value;
