//! A compiled service and its router.

use std::sync::Arc;

use axum::extract::Request;
use axum::routing::post;
use axum::Router;
use entangle_schema::{
    compile, Branch, CompiledSchema, ErrorClass, ErrorRegistry, ErrorSpec, Manifest,
};

use crate::config::ServeConfig;
use crate::context::Contexts;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::procedure::{Procedure, ServiceNode};

/// A branch of a service tree.
pub type ServiceBranch = Branch<Arc<dyn Procedure>, ErrorClass>;

/// A tree of procedures and error types, compiled and ready to serve.
///
/// The service owns everything requests share: the compiled routes, the
/// error registry and the context store. Nothing is process-global, so
/// several services can live side by side.
#[derive(Clone)]
pub struct Service {
    schema: CompiledSchema<Arc<dyn Procedure>, ErrorClass>,
    manifest: Manifest,
    errors: Arc<ErrorRegistry>,
    contexts: Contexts,
    body_limit: usize,
}

impl Service {
    /// Compile a service tree.
    ///
    /// Fails on invalid names, colliding paths and error types declared
    /// twice.
    pub fn new(root: impl Into<ServiceNode>) -> Result<Self> {
        let root = root.into();
        let schema = compile(&root)?;
        let errors = ErrorRegistry::from_schema(&schema)?;
        let manifest = root.map(
            &|procedure: &Arc<dyn Procedure>| procedure.spec(),
            &|class: &ErrorClass| ErrorSpec::new(class.name()),
        );

        tracing::info!(
            routes = schema.callables().count(),
            errors = errors.len(),
            "compiled service"
        );

        Ok(Self {
            schema,
            manifest,
            errors: Arc::new(errors),
            contexts: Contexts::new(),
            body_limit: ServeConfig::default().body_limit,
        })
    }

    /// Use a context store the procedures already hold a handle to.
    pub fn with_contexts(mut self, contexts: Contexts) -> Self {
        self.contexts = contexts;
        self
    }

    /// Largest accepted request body, in bytes.
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// The routes, callables and error types alike.
    pub fn schema(&self) -> &CompiledSchema<Arc<dyn Procedure>, ErrorClass> {
        &self.schema
    }

    /// The tree as clients should see it.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    pub fn contexts(&self) -> &Contexts {
        &self.contexts
    }

    /// One POST route per callable, at its compiled path.
    ///
    /// The root path is served at `/`. Layers added to the returned router
    /// (authentication and the like) run before dispatch.
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for (route, procedure) in self.schema.callables() {
            let dispatcher = Arc::new(Dispatcher {
                path: route.path.clone(),
                procedure: Arc::clone(procedure),
                kind: procedure.spec().kind,
                errors: Arc::clone(&self.errors),
                contexts: self.contexts.clone(),
                body_limit: self.body_limit,
            });

            let path = if route.path.is_root() {
                "/".to_string()
            } else {
                route.path.to_string()
            };

            tracing::debug!(path = %path, "mounted route");
            router = router.route(
                &path,
                post(move |request: Request| async move { dispatcher.handle(request).await }),
            );
        }

        router
    }

    /// The router mounted under `base_url`, e.g. `/api`.
    pub fn nest(&self, base_url: &str) -> Router {
        let base = base_url.trim_end_matches('/');
        if base.is_empty() {
            return self.router();
        }
        if base.starts_with('/') {
            Router::new().nest(base, self.router())
        } else {
            Router::new().nest(&format!("/{}", base), self.router())
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes: Vec<String> = self
            .schema
            .routes()
            .iter()
            .map(|route| route.path.to_string())
            .collect();
        f.debug_struct("Service")
            .field("routes", &routes)
            .field("errors", &self.errors.len())
            .field("contexts", &self.contexts)
            .finish()
    }
}
