//! Error registry: route path to error class.
//!
//! The server uses it to tag a failing call with the path of the declared
//! error type; the client uses it to turn an error body back into an
//! instance of its own mirror class.

use std::collections::BTreeMap;

use entangle_wire::ErrorBody;

use crate::compile::CompiledSchema;
use crate::error::Result;
use crate::node::ErrorSpec;
use crate::{AppError, ErrorClass, RoutePath, SchemaError};

/// Name of the class every synthesized class derives from, and the class
/// unknown error codes fall back to.
pub const BASE_ERROR: &str = "Error";

/// Leaf payloads that can stand for an error class.
pub trait ErrorLeaf {
    /// The class registered for this leaf.
    ///
    /// `name` is the leaf's declared name and `base` the registry's base
    /// class.
    fn error_class(&self, name: &str, base: &ErrorClass) -> ErrorClass;
}

impl ErrorLeaf for ErrorClass {
    fn error_class(&self, _name: &str, _base: &ErrorClass) -> ErrorClass {
        self.clone()
    }
}

impl ErrorLeaf for ErrorSpec {
    fn error_class(&self, name: &str, base: &ErrorClass) -> ErrorClass {
        let name = if self.name.is_empty() { name } else { self.name.as_str() };
        base.extend(if name.is_empty() { BASE_ERROR } else { name })
    }
}

/// Registered error classes, owned by one service or proxy.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    by_path: BTreeMap<RoutePath, ErrorClass>,
    base: ErrorClass,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self {
            by_path: BTreeMap::new(),
            base: ErrorClass::new(BASE_ERROR),
        }
    }
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every error type route of a compiled schema.
    pub fn from_schema<C, E: ErrorLeaf>(schema: &CompiledSchema<C, E>) -> Result<Self> {
        let mut registry = Self::new();
        for (route, leaf) in schema.error_types() {
            let class = leaf.error_class(&route.name, &registry.base);
            registry.register(route.path.clone(), class)?;
        }
        Ok(registry)
    }

    /// Register a class under a path.
    ///
    /// A path can hold one class and a class can live at one path.
    pub fn register(&mut self, path: RoutePath, class: ErrorClass) -> Result<()> {
        if self.by_path.contains_key(&path) {
            return Err(SchemaError::DuplicateError {
                path: path.to_string(),
                message: "path already registered".to_string(),
            });
        }
        if let Some((other, _)) = self.by_path.iter().find(|(_, c)| **c == class) {
            return Err(SchemaError::DuplicateError {
                path: path.to_string(),
                message: format!("class {} already registered at '{}'", class.name(), other),
            });
        }
        tracing::debug!(path = %path, class = class.name(), "registered error type");
        self.by_path.insert(path, class);
        Ok(())
    }

    /// Create a client-side mirror class with the declared name and register it.
    pub fn synthesize(&mut self, path: RoutePath, name: &str) -> Result<ErrorClass> {
        let class = ErrorSpec::new(name).error_class(name, &self.base);
        self.register(path, class.clone())?;
        Ok(class)
    }

    /// The path of the nearest registered class in the error's ancestry.
    pub fn identify(&self, error: &AppError) -> Option<&RoutePath> {
        error.class().ancestors().find_map(|ancestor| {
            self.by_path
                .iter()
                .find(|(_, class)| *class == ancestor)
                .map(|(path, _)| path)
        })
    }

    /// Class registered at an error code. Case-insensitive.
    pub fn lookup(&self, code: &str) -> Option<&ErrorClass> {
        let path = RoutePath::parse(code).ok()?;
        self.by_path.get(&path)
    }

    /// Rebuild an error from a received body.
    ///
    /// The class is looked up by the body's `error` code, falling back to
    /// the base class. Only codes starting with `/` name registered paths;
    /// short codes such as `forbidden` always map to the base class, even
    /// when an error type is declared at `/forbidden`. Every extra field is
    /// copied onto the instance.
    pub fn reconstruct(&self, body: ErrorBody) -> AppError {
        let class = Some(body.error.as_str())
            .filter(|code| code.starts_with('/'))
            .and_then(|code| self.lookup(code))
            .cloned()
            .unwrap_or_else(|| self.base.clone());

        let mut error = AppError::new(class, body.message);
        for (name, value) in body.fields {
            error = error.with_field(name, value);
        }
        error.received(body.error, body.stack)
    }

    /// The root class of synthesized classes.
    pub fn base(&self) -> &ErrorClass {
        &self.base
    }

    pub fn get(&self, path: &RoutePath) -> Option<&ErrorClass> {
        self.by_path.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoutePath, &ErrorClass)> {
        self.by_path.iter()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
