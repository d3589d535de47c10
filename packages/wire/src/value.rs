//! The Value type - what arguments and results are made of.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A dynamically typed tree passed to and returned from remote functions.
///
/// Maps to JSON, plus two things JSON lacks: dates, which the codec tags, and
/// function references, which the codec strips.
///
/// # Design Notes
///
/// - Uses `BTreeMap` so equality and encoding never depend on insertion order
/// - Dates carry millisecond precision, the resolution of the wire tag
/// - `Function` exists only to be dropped at the wire boundary
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Explicit null. Distinct from an absent map entry.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Point in time, UTC, at whole milliseconds.
    ///
    /// The wire tag carries milliseconds only, so a date built directly with
    /// finer precision comes back truncated. Build dates through
    /// `Value::from` or [`Value::date_millis`], which truncate up front.
    Date(DateTime<Utc>),
    /// A callable that cannot cross the wire. Holds a name for diagnostics.
    Function(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Create a date from milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the instant is outside chrono's range.
    pub fn date_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Value::Date)
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Insert a key, turning `Null` into an empty map first.
    ///
    /// Returns `false` (and leaves the value untouched) for any other
    /// non-map value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        if self.is_null() {
            *self = Value::map();
        }
        match self {
            Value::Map(map) => {
                map.insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Function(_) => "function",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

// Conversion from common types

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    /// Sub-millisecond precision is dropped so the value survives the wire.
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(DateTime::from_timestamp_millis(v.timestamp_millis()).unwrap_or(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use collection_literals::btree;

    #[test]
    fn dates_from_chrono_survive_the_wire() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();

        let value = Value::from(precise);
        assert_eq!(value, Value::date_millis(1_700_000_000_123).unwrap());
        assert_eq!(crate::decode(crate::encode(&value).unwrap()), value);

        // built directly, the sub-millisecond part is lost in transit
        let raw = Value::Date(precise);
        assert_ne!(crate::decode(crate::encode(&raw).unwrap()), raw);
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7i64).as_i64(), Some(7));
        assert_eq!(Value::from(7i64).as_f64(), Some(7.0));
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from("hi").as_i64(), None);
        assert!(Value::Null.is_null());
        assert!(Value::map().is_map());
        assert!(Value::array().is_array());
    }

    #[test]
    fn get_reads_map_keys() {
        let value = Value::from(btree! {
            "name".to_string() => Value::from("Alice"),
        });
        assert_eq!(value.get("name"), Some(&Value::from("Alice")));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::from(3i64).get("name"), None);
    }

    #[test]
    fn insert_promotes_null_to_map() {
        let mut value = Value::Null;
        assert!(value.insert("a", 1i64));
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));

        let mut scalar = Value::from("x");
        assert!(!scalar.insert("a", 1i64));
        assert_eq!(scalar, Value::from("x"));
    }

    #[test]
    fn date_conversion_truncates_to_millis() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let value = Value::from(precise);
        let date = value.as_date().unwrap();
        assert_eq!(date.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(date.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn date_millis_rejects_out_of_range() {
        assert!(Value::date_millis(0).is_some());
        assert!(Value::date_millis(i64::MAX).is_none());
    }

    #[test]
    fn option_and_unit_become_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(2i64)), Value::Integer(2));
        assert_eq!(Value::from(()), Value::Null);
    }

    #[test]
    fn vec_converts_elementwise() {
        let value = Value::from(vec!["a", "b"]);
        assert_eq!(
            value,
            Value::Array(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Function("cb".to_string()).kind(), "function");
        assert_eq!(Value::map().kind(), "map");
    }
}
