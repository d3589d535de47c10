//! JSON wire codec.
//!
//! `encode` walks a `Value` and produces JSON that any JSON transport can
//! carry; `decode` walks JSON back into a `Value`. Two things need care:
//!
//! - Dates become `<epoch-millis>Z` strings. A user string matching
//!   `~*-?\d+Z` gets one extra leading `~` so it cannot be read as a date.
//! - Functions are dropped: omitted from maps, `null` in arrays (positions
//!   are preserved), `null` at the top level.
//!
//! Decoding is permissive: strings that are not tags come back unchanged.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Number};

use crate::{CodecError, Json, Value};

/// Prefix used to escape strings that look like date tags.
pub const ESCAPE_PREFIX: char = '~';

lazy_static! {
    static ref DATE_TAG: Regex = Regex::new(r"^(-?[0-9]+)Z$").unwrap();
    static ref TAG_LIKE: Regex = Regex::new(r"^~*-?[0-9]+Z$").unwrap();
    static ref ESCAPED_TAG: Regex = Regex::new(r"^~+-?[0-9]+Z$").unwrap();
}

/// Encode a value for transport.
///
/// Fails only for floats JSON cannot represent (NaN, infinities).
pub fn encode(value: &Value) -> Result<Json, CodecError> {
    Ok(encode_entry(value)?.unwrap_or(Json::Null))
}

/// Encode one entry; `None` means "leave it out".
fn encode_entry(value: &Value) -> Result<Option<Json>, CodecError> {
    let json = match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => Json::Number((*i).into()),
        Value::Float(f) => Json::Number(
            Number::from_f64(*f).ok_or(CodecError::NonFiniteNumber { value: *f })?,
        ),
        Value::String(s) => Json::String(escape(s)),
        Value::Date(date) => Json::String(date_tag(date)),
        Value::Function(_) => return Ok(None),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(encode_entry(item)?.unwrap_or(Json::Null));
            }
            Json::Array(out)
        }
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                if let Some(encoded) = encode_entry(item)? {
                    out.insert(key.clone(), encoded);
                }
            }
            Json::Object(out)
        }
    };
    Ok(Some(json))
}

/// Decode a value received from the wire.
pub fn decode(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for numbers outside f64
                Value::String(n.to_string())
            }
        }
        Json::String(s) => decode_string(s),
        Json::Array(items) => Value::Array(items.into_iter().map(decode).collect()),
        Json::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, decode(v))).collect()),
    }
}

fn date_tag(date: &DateTime<Utc>) -> String {
    format!("{}Z", date.timestamp_millis())
}

fn escape(s: &str) -> String {
    if TAG_LIKE.is_match(s) {
        format!("{}{}", ESCAPE_PREFIX, s)
    } else {
        s.to_string()
    }
}

fn decode_string(s: String) -> Value {
    if let Some(captures) = DATE_TAG.captures(&s) {
        let date = captures[1]
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        return match date {
            Some(date) => Value::Date(date),
            None => Value::String(s),
        };
    }

    if ESCAPED_TAG.is_match(&s) {
        return Value::String(s[ESCAPE_PREFIX.len_utf8()..].to_string());
    }

    Value::String(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use serde_json::json;

    fn date(millis: i64) -> Value {
        Value::date_millis(millis).unwrap()
    }

    #[test]
    fn date_encodes_as_millis_tag() {
        assert_eq!(encode(&date(1_700_000_000_000)).unwrap(), json!("1700000000000Z"));
        assert_eq!(decode(json!("1700000000000Z")), date(1_700_000_000_000));
    }

    #[test]
    fn pre_epoch_dates_keep_sign() {
        assert_eq!(encode(&date(-86_400_000)).unwrap(), json!("-86400000Z"));
        assert_eq!(decode(json!("-86400000Z")), date(-86_400_000));
    }

    #[test]
    fn tag_like_strings_are_escaped() {
        let value = Value::from("42Z");
        let encoded = encode(&value).unwrap();
        assert_eq!(encoded, json!("~42Z"));
        assert_eq!(decode(encoded), value);

        let already = Value::from("~~42Z");
        let encoded = encode(&already).unwrap();
        assert_eq!(encoded, json!("~~~42Z"));
        assert_eq!(decode(encoded), already);
    }

    #[test]
    fn ordinary_strings_pass_through() {
        for s in ["hello", "Z", "12", "12z", "1.5Z", "~", "~hello", "Zulu 12Z later"] {
            assert_eq!(encode(&Value::from(s)).unwrap(), json!(s));
            assert_eq!(decode(json!(s)), Value::from(s));
        }
    }

    #[test]
    fn out_of_range_tag_stays_a_string() {
        let huge = "99999999999999999999Z";
        assert_eq!(decode(json!(huge)), Value::from(huge));
        // and a user string of that shape still round-trips
        let encoded = encode(&Value::from(huge)).unwrap();
        assert_eq!(decode(encoded), Value::from(huge));
    }

    #[test]
    fn functions_are_stripped() {
        let value = Value::from(btree! {
            "keep".to_string() => Value::from(1i64),
            "callback".to_string() => Value::Function("onDone".to_string()),
        });
        assert_eq!(encode(&value).unwrap(), json!({"keep": 1}));

        let list = Value::Array(vec![
            Value::from(1i64),
            Value::Function("f".to_string()),
            Value::from(3i64),
        ]);
        assert_eq!(encode(&list).unwrap(), json!([1, null, 3]));

        assert_eq!(encode(&Value::Function("f".to_string())).unwrap(), Json::Null);
    }

    #[test]
    fn null_is_kept_distinct_from_absent() {
        let value = Value::from(btree! {
            "nothing".to_string() => Value::Null,
        });
        assert_eq!(encode(&value).unwrap(), json!({"nothing": null}));
    }

    #[test]
    fn nested_structures_roundtrip() {
        let value = Value::from(btree! {
            "user".to_string() => Value::from(btree! {
                "name".to_string() => Value::from("Ada"),
                "born".to_string() => date(-4_500_000_000_000),
                "tags".to_string() => Value::from(vec!["a", "7Z"]),
            }),
            "scores".to_string() => Value::Array(vec![Value::from(1.5), Value::from(-3i64)]),
            "active".to_string() => Value::from(true),
        });
        assert_eq!(decode(encode(&value).unwrap()), value);
    }

    #[test]
    fn nan_is_rejected() {
        let err = encode(&Value::Array(vec![Value::Float(f64::NAN)])).unwrap_err();
        assert!(matches!(err, CodecError::NonFiniteNumber { .. }));
    }

    #[test]
    fn floats_stay_floats() {
        let encoded = encode(&Value::Float(2.0)).unwrap();
        assert_eq!(decode(encoded), Value::Float(2.0));
    }

    #[test]
    fn decode_of_text_roundtrip() {
        let value = Value::Array(vec![date(0), Value::from("0Z"), Value::Float(0.25)]);
        let text = serde_json::to_string(&encode(&value).unwrap()).unwrap();
        assert_eq!(text, r#"["0Z","~0Z",0.25]"#);
        let parsed: Json = serde_json::from_str(&text).unwrap();
        assert_eq!(decode(parsed), value);
    }
}
