//! Manifest wire format.
//!
//! A manifest is the schema as clients see it, serialized as JSON:
//!
//! - a branch is an object, entries in declaration order
//! - `[0]` a synchronous function (listed, not remotely callable)
//! - `[1, [params...], ...]` an async function, one parameter list per signature
//! - `[2]` an error type, named by its key
//! - `[3, [param]]` an async function taking its argument as the request body
//!
//! ```rust
//! use entangle_schema::{CallKind, Manifest, Node};
//!
//! let manifest: Manifest = serde_json::from_str(r#"{
//!     "hello": [1, []],
//!     "errors": { "SpecialError": [2] }
//! }"#).unwrap();
//!
//! let Some(Node::Callable(hello)) = manifest.descend(["hello"]) else { panic!() };
//! assert_eq!(hello.kind, CallKind::Async);
//! ```

use std::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::node::{Branch, CallKind, CallableSpec, ErrorSpec, Manifest, Node};

const TAG_SYNC: u8 = 0;
const TAG_ASYNC: u8 = 1;
const TAG_ERROR: u8 = 2;
const TAG_POST_BODY: u8 = 3;

impl Serialize for CallableSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = match self.kind {
            CallKind::Sync => TAG_SYNC,
            CallKind::Async => TAG_ASYNC,
            CallKind::PostBody => TAG_POST_BODY,
        };
        let len = match self.kind {
            CallKind::Sync => 1,
            _ => 1 + self.signatures.len(),
        };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&tag)?;
        if self.kind != CallKind::Sync {
            for signature in &self.signatures {
                seq.serialize_element(signature)?;
            }
        }
        seq.end()
    }
}

impl Serialize for ErrorSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&TAG_ERROR)?;
        seq.end()
    }
}

impl<C: Serialize, E: Serialize> Serialize for Node<C, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Callable(c) => c.serialize(serializer),
            Node::ErrorType(e) => e.serialize(serializer),
            Node::Branch(branch) => {
                let mut map = serializer.serialize_map(Some(branch.len()))?;
                for (name, child) in branch.entries() {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        NodeSeed { name: "" }.deserialize(deserializer)
    }
}

/// Deserializes a node knowing the key it sits under, which is how error
/// types learn their names.
struct NodeSeed<'a> {
    name: &'a str,
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = Manifest;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Manifest, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = Manifest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a manifest object or a tagged leaf array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Manifest, A::Error> {
        let tag: u8 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &"a leaf tag"))?;

        let kind = match tag {
            TAG_SYNC => CallKind::Sync,
            TAG_ASYNC => CallKind::Async,
            TAG_POST_BODY => CallKind::PostBody,
            TAG_ERROR => {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                return Ok(Node::ErrorType(ErrorSpec::new(self.name)));
            }
            other => {
                return Err(de::Error::custom(format!("unknown entity type {}", other)));
            }
        };

        let mut signatures = Vec::new();
        if kind == CallKind::Sync {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
        } else {
            while let Some(signature) = seq.next_element::<Vec<String>>()? {
                signatures.push(signature);
            }
        }

        Ok(Node::Callable(CallableSpec { kind, signatures }))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Manifest, A::Error> {
        let mut branch = Branch::new();
        while let Some(name) = map.next_key::<String>()? {
            let child = map.next_value_seed(NodeSeed { name: &name })?;
            branch.insert(name, child);
        }
        Ok(Node::Branch(branch))
    }
}
