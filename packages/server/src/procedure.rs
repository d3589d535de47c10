//! Procedures: the callables a service serves.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use entangle_schema::{CallKind, CallableSpec, ErrorClass, Node};
use entangle_wire::{from_value, Value};
use serde::de::DeserializeOwned;

use crate::error::{CallError, RestError};

/// A schema tree as a service serves it.
pub type ServiceNode = Node<Arc<dyn Procedure>, ErrorClass>;

/// A function reachable over the wire.
#[async_trait]
pub trait Procedure: Send + Sync + 'static {
    /// Invoke with decoded arguments.
    async fn call(&self, args: Args) -> Result<Value, CallError>;

    /// How clients should call this procedure.
    fn spec(&self) -> CallableSpec;
}

/// Positional arguments of a call.
///
/// For post-body procedures the request object is the single argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// The argument at `index`; `Null` when the caller passed fewer.
    pub fn get(&self, index: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.0.get(index).unwrap_or(NULL)
    }

    /// The argument at `index`, converted through serde.
    ///
    /// A value of the wrong shape is the caller's fault and reported as
    /// bad input.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T, RestError> {
        from_value(self.get(index).clone()).map_err(|err| {
            RestError::bad_input(format!("argument {} is invalid: {}", index, err))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// A procedure backed by an async closure.
pub struct FnProcedure<F> {
    handler: F,
    spec: CallableSpec,
}

impl<F> FnProcedure<F> {
    /// Declare a parameter list, as listed in the manifest.
    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        match self.spec.signatures.first_mut() {
            Some(first) if first.is_empty() => *first = params,
            _ => self.spec.signatures.push(params),
        }
        self
    }

    /// Take the request body object as the single argument.
    pub fn post_body(mut self, param: impl Into<String>) -> Self {
        self.spec = CallableSpec::post_body(param);
        self
    }

    /// Mark as synchronous: listed in the manifest, refused by clients.
    pub fn synchronous(mut self) -> Self {
        self.spec.kind = CallKind::Sync;
        self
    }
}

/// Wrap an async closure as a procedure.
///
/// ```rust
/// use entangle_server::{procedure, Args};
///
/// let hello = procedure(|_args: Args| async { Ok("Hello World!") });
/// let greet = procedure(|args: Args| async move {
///     let name: String = args.parse(0)?;
///     Ok(format!("Hello {}!", name))
/// })
/// .with_params(["name"]);
/// ```
pub fn procedure<F, Fut, R>(handler: F) -> FnProcedure<F>
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, CallError>> + Send + 'static,
    R: Into<Value>,
{
    FnProcedure {
        handler,
        spec: CallableSpec::asynchronous(Vec::<String>::new()),
    }
}

#[async_trait]
impl<F, Fut, R> Procedure for FnProcedure<F>
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, CallError>> + Send + 'static,
    R: Into<Value>,
{
    async fn call(&self, args: Args) -> Result<Value, CallError> {
        (self.handler)(args).await.map(Into::into)
    }

    fn spec(&self) -> CallableSpec {
        self.spec.clone()
    }
}

impl<F, Fut, R> From<FnProcedure<F>> for ServiceNode
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, CallError>> + Send + 'static,
    R: Into<Value>,
{
    fn from(procedure: FnProcedure<F>) -> Self {
        Node::Callable(Arc::new(procedure))
    }
}
