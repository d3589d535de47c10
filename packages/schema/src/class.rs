//! Application error classes and instances.
//!
//! An [`ErrorClass`] is an identity: two classes are equal only if they are
//! the same class, never because they share a name. Classes form single
//! inheritance chains, and [`AppError::is`] answers "is this error an
//! instance of that class or one of its subclasses".

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use entangle_wire::Value;

/// Status used when no class in the chain declares one.
pub const DEFAULT_STATUS: u16 = 500;

/// A declared error type.
#[derive(Clone)]
pub struct ErrorClass {
    inner: Arc<ClassInner>,
}

struct ClassInner {
    name: String,
    parent: Option<ErrorClass>,
    status: Option<u16>,
}

impl ErrorClass {
    /// A root class answering with status 500.
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), None, None)
    }

    /// A root class answering with the given status.
    pub fn with_status(name: impl Into<String>, status: u16) -> Self {
        Self::build(name.into(), None, Some(status))
    }

    /// A subclass inheriting this class's status.
    pub fn extend(&self, name: impl Into<String>) -> Self {
        Self::build(name.into(), Some(self.clone()), None)
    }

    /// A subclass with its own status.
    pub fn extend_with_status(&self, name: impl Into<String>, status: u16) -> Self {
        Self::build(name.into(), Some(self.clone()), Some(status))
    }

    fn build(name: String, parent: Option<ErrorClass>, status: Option<u16>) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name,
                parent,
                status,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&ErrorClass> {
        self.inner.parent.as_ref()
    }

    /// HTTP status of errors of this class: the nearest declared status in
    /// the chain, else 500.
    pub fn status(&self) -> u16 {
        self.ancestors()
            .find_map(|class| class.inner.status)
            .unwrap_or(DEFAULT_STATUS)
    }

    /// This class, then its parent, up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &ErrorClass> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    /// Whether this class is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &ErrorClass) -> bool {
        self.ancestors().any(|class| class == other)
    }

    /// Create an instance of this class.
    pub fn create(&self, message: impl Into<String>) -> AppError {
        AppError::new(self.clone(), message)
    }
}

impl PartialEq for ErrorClass {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ErrorClass {}

impl fmt::Debug for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.ancestors().map(ErrorClass::name);
        write!(f, "ErrorClass({}", names.next().unwrap_or_default())?;
        for name in names {
            write!(f, " < {}", name)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An instance of an application error.
///
/// Besides its message, an instance carries arbitrary extra fields. They
/// travel in the error body and are restored on the client.
#[derive(Debug, Clone)]
pub struct AppError {
    class: ErrorClass,
    message: String,
    fields: BTreeMap<String, Value>,
    code: Option<String>,
    remote_stack: Vec<String>,
}

impl AppError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            fields: BTreeMap::new(),
            code: None,
            remote_stack: Vec::new(),
        }
    }

    /// Attach an extra field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn class(&self) -> &ErrorClass {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.class.status()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The `error` code this instance was received with, if it came off the
    /// wire.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Stack lines reported by the remote side.
    pub fn remote_stack(&self) -> &[String] {
        &self.remote_stack
    }

    /// The `instanceof` check.
    pub fn is(&self, class: &ErrorClass) -> bool {
        self.class.is_subclass_of(class)
    }

    pub(crate) fn received(mut self, code: String, stack: Vec<String>) -> Self {
        self.code = Some(code);
        self.remote_stack = stack;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}: {}", self.name(), self.message)
        }
    }
}

impl std::error::Error for AppError {}
