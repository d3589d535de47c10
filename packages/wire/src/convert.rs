//! Conversions between Value and serde types.
//!
//! These are plain structural conversions. No date tags are involved: dates
//! are handed to serde as RFC 3339 strings (what chrono's serde support
//! expects), and strings coming from serde stay strings.

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CodecError, Json, Value};

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    Ok(serde_json::from_value(value_to_json(value))?)
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, CodecError> {
    Ok(json_to_value(serde_json::to_value(data)?))
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: Value) -> Json {
    match value {
        Value::Null | Value::Function(_) => Json::Null,
        Value::Bool(b) => Json::Bool(b),
        Value::Integer(i) => Json::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s),
        Value::Date(d) => Json::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Array(arr) => Json::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => Json::Object(
            map.into_iter()
                .filter(|(_, v)| !matches!(v, Value::Function(_)))
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        Json::String(s) => Value::String(s),
        Json::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        Json::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestStruct {
        name: String,
        age: u32,
        active: bool,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Birthday {
        name: String,
        birthday: DateTime<Utc>,
    }

    #[test]
    fn roundtrip_struct() {
        let original = TestStruct {
            name: "Alice".to_string(),
            age: 30,
            active: true,
        };

        let value = to_value(&original).unwrap();
        let recovered: TestStruct = from_value(value).unwrap();

        assert_eq!(original, recovered);
    }

    #[test]
    fn dates_deserialize_into_chrono() {
        let mut value = Value::map();
        value.insert("name", "Me");
        value.insert("birthday", Value::date_millis(0).unwrap());

        let parsed: Birthday = from_value(value).unwrap();
        assert_eq!(parsed.name, "Me");
        assert_eq!(parsed.birthday.timestamp_millis(), 0);
    }

    #[test]
    fn to_value_keeps_strings_plain() {
        let value = to_value(&"1700000000000Z").unwrap();
        assert_eq!(value, Value::from("1700000000000Z"));
    }

    #[test]
    fn value_to_json_drops_functions() {
        let mut value = Value::map();
        value.insert("a", 1i64);
        value.insert("f", Value::Function("f".to_string()));
        assert_eq!(value_to_json(value), serde_json::json!({"a": 1}));
    }

    #[test]
    fn value_to_json_nan_becomes_null() {
        assert_eq!(value_to_json(Value::Float(f64::NAN)), Json::Null);
    }

    #[test]
    fn json_to_value_numbers() {
        let json = serde_json::json!({
            "integer": 42,
            "float": 2.75,
            "negative": -100
        });

        let value = json_to_value(json);
        assert_eq!(value.get("integer"), Some(&Value::Integer(42)));
        assert_eq!(value.get("negative"), Some(&Value::Integer(-100)));
        assert_eq!(value.get("float"), Some(&Value::Float(2.75)));
    }

    #[test]
    fn from_value_type_mismatch_is_error() {
        let result: Result<TestStruct, _> = from_value(Value::from("nope"));
        assert!(matches!(result, Err(CodecError::Serde(_))));
    }
}
