//! Mirrored trees of remote functions.

use std::collections::HashMap;
use std::sync::Arc;

use entangle_schema::{
    compile, CallKind, CallableSpec, CompiledSchema, ErrorClass, ErrorRegistry, ErrorSpec,
    Manifest, RoutePath, Target,
};
use entangle_wire::{encode, unwrap_success, ErrorBody, Json, Value};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{CallRequest, CallResponse};

/// A remote service, seen through its manifest.
///
/// Every callable in the manifest becomes a [`RemoteFunction`] at the same
/// path the server serves it at, and every error type becomes a local
/// [`ErrorClass`] that failed calls are reconstructed into.
pub struct Proxy {
    schema: CompiledSchema<CallableSpec, ErrorSpec>,
    functions: HashMap<RoutePath, RemoteFunction>,
    errors: Arc<ErrorRegistry>,
}

impl Proxy {
    /// Build a proxy that calls over HTTP.
    pub fn new(manifest: &Manifest, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(manifest, config, Arc::new(transport))
    }

    /// Build a proxy from a manifest in its JSON form.
    pub fn from_json(manifest: Json, config: ClientConfig) -> Result<Self> {
        let manifest: Manifest = serde_json::from_value(manifest)?;
        Self::new(&manifest, config)
    }

    pub fn with_transport(
        manifest: &Manifest,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let schema = compile(manifest)?;
        let errors = Arc::new(ErrorRegistry::from_schema(&schema)?);
        let headers = Arc::new(config.default_headers.clone());

        let functions = schema
            .callables()
            .map(|(route, spec)| {
                let function = RemoteFunction {
                    path: route.path.clone(),
                    spec: spec.clone(),
                    url: config.url_for(&route.path.to_string()),
                    headers: Arc::clone(&headers),
                    transport: Arc::clone(&transport),
                    errors: Arc::clone(&errors),
                };
                (route.path.clone(), function)
            })
            .collect::<HashMap<_, _>>();

        tracing::debug!(
            endpoint = %config.endpoint,
            functions = functions.len(),
            errors = errors.len(),
            "built proxy"
        );

        Ok(Self {
            schema,
            functions,
            errors,
        })
    }

    /// The function at a slash path such as `greetings/hello`.
    ///
    /// Lookup is case-insensitive, like the server's routing.
    pub fn function(&self, path: &str) -> Result<&RemoteFunction> {
        RoutePath::parse(path)
            .ok()
            .and_then(|parsed| self.functions.get(&parsed))
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    /// Call the function at `path`.
    pub async fn call(&self, path: &str, args: Vec<Value>) -> Result<Value> {
        self.function(path)?.call(args).await
    }

    /// The local class mirroring the error type at `path`.
    pub fn error_class(&self, path: &str) -> Option<&ErrorClass> {
        self.errors.lookup(path)
    }

    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    /// Every route of the manifest, callables and error types alike.
    pub fn paths(&self) -> impl Iterator<Item = &RoutePath> {
        self.schema.routes().iter().map(|route| &route.path)
    }

    pub fn functions(&self) -> impl Iterator<Item = &RemoteFunction> {
        self.functions.values()
    }

    /// Whether the manifest declares `path`, and as what.
    pub fn target(&self, path: &str) -> Option<&Target<CallableSpec, ErrorSpec>> {
        self.schema.get(path).map(|route| &route.target)
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<String> = self.functions.keys().map(|p| p.to_string()).collect();
        paths.sort();
        f.debug_struct("Proxy")
            .field("functions", &paths)
            .field("errors", &self.errors.len())
            .finish()
    }
}

/// A procedure on the server, callable as a local async function.
#[derive(Clone)]
pub struct RemoteFunction {
    path: RoutePath,
    spec: CallableSpec,
    url: String,
    headers: Arc<HashMap<String, String>>,
    transport: Arc<dyn Transport>,
    errors: Arc<ErrorRegistry>,
}

impl RemoteFunction {
    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    pub fn spec(&self) -> &CallableSpec {
        &self.spec
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call the procedure.
    ///
    /// Arguments are encoded with the wire codec and sent as an array; a
    /// post-body procedure called with a single map sends that map as the
    /// body instead. Synchronous procedures fail without any I/O.
    pub async fn call(&self, args: Vec<Value>) -> Result<Value> {
        if !self.spec.is_remote() {
            return Err(Error::NotAsync {
                path: self.path.to_string(),
            });
        }

        let body = self.encode_args(args)?;
        let mut request = CallRequest::new(self.url.clone(), body);
        request.headers = (*self.headers).clone();

        tracing::debug!(path = %self.path, url = %self.url, "calling remote function");
        let response = self.transport.post(&request).await?;
        self.read_response(response)
    }

    fn encode_args(&self, args: Vec<Value>) -> Result<Json> {
        if self.spec.kind == CallKind::PostBody && args.len() == 1 && args[0].is_map() {
            return Ok(encode(&args[0])?);
        }
        Ok(encode(&Value::Array(args))?)
    }

    fn read_response(&self, response: CallResponse) -> Result<Value> {
        let Some(json) = response.body else {
            tracing::debug!(
                path = %self.path,
                status = response.status,
                "remote function answered with a body that is not JSON"
            );
            return Err(Error::UnexpectedResponse {
                status: response.status,
                message: response.body_text,
            });
        };

        if response.status < 300 {
            return Ok(unwrap_success(json));
        }

        match ErrorBody::from_json(json) {
            Ok(body) => {
                let error = self.errors.reconstruct(body);
                tracing::debug!(
                    path = %self.path,
                    status = response.status,
                    error = %error,
                    "remote function failed"
                );
                Err(Error::Remote {
                    status: response.status,
                    error,
                })
            }
            Err(_) => Err(Error::UnexpectedResponse {
                status: response.status,
                message: response.body_text,
            }),
        }
    }
}

impl std::fmt::Debug for RemoteFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFunction")
            .field("path", &self.path.to_string())
            .field("kind", &self.spec.kind)
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    const ENDPOINT: &str = "http://localhost:8080/api";

    fn manifest() -> Manifest {
        serde_json::from_value(json!({
            "hello": [1, []],
            "Greetings": {
                "default": [1, ["name"]],
                "now": [0],
                "create": [3, ["greeting"]],
            },
            "errors": {"SpecialError": [2]},
        }))
        .unwrap()
    }

    fn proxy(transport: &MockTransport) -> Proxy {
        Proxy::with_transport(
            &manifest(),
            ClientConfig::new(ENDPOINT)
                .unwrap()
                .with_header("Authorization", "Bearer token"),
            Arc::new(transport.clone()),
        )
        .unwrap()
    }

    fn url(path: &str) -> String {
        format!("{}{}", ENDPOINT, path)
    }

    #[test]
    fn functions_mirror_server_paths() {
        let proxy = proxy(&MockTransport::new());
        let mut paths: Vec<String> = proxy.functions().map(|f| f.path().to_string()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec!["/greetings", "/greetings/create", "/greetings/now", "/hello"]
        );
        assert_eq!(
            proxy.function("GREETINGS").unwrap().url(),
            "http://localhost:8080/api/greetings"
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let proxy = proxy(&MockTransport::new());
        assert!(matches!(
            proxy.function("greetings/missing"),
            Err(Error::NotFound { .. })
        ));
        // error types are not callable
        assert!(proxy.function("errors/specialerror").is_err());
        assert!(matches!(
            proxy.target("errors/specialerror"),
            Some(Target::ErrorType(_))
        ));
    }

    #[tokio::test]
    async fn calls_post_encoded_arguments() {
        let transport = MockTransport::new().with_response(
            url("/greetings"),
            CallResponse::new(200, json!({"response": "Hello Ada"})),
        );
        let proxy = proxy(&transport);

        let result = proxy
            .call("greetings", vec![Value::from("Ada"), Value::date_millis(0).unwrap()])
            .await
            .unwrap();
        assert_eq!(result, Value::from("Hello Ada"));

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].url, url("/greetings"));
        assert_eq!(recorded[0].body, json!(["Ada", "0Z"]));
        assert_eq!(
            recorded[0].headers.get("Authorization"),
            Some(&"Bearer token".to_string())
        );
    }

    #[tokio::test]
    async fn map_results_are_returned_whole() {
        let transport = MockTransport::new().with_response(
            url("/hello"),
            CallResponse::new(200, json!({"id": 7, "at": "1700000000000Z"})),
        );
        let result = proxy(&transport).call("hello", vec![]).await.unwrap();
        assert_eq!(result.get("id"), Some(&Value::from(7i64)));
        assert_eq!(
            result.get("at").and_then(Value::as_date).map(|d| d.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[tokio::test]
    async fn post_body_sends_single_map() {
        let transport = MockTransport::new().with_response(
            url("/greetings/create"),
            CallResponse::new(200, json!({"response": true})),
        );
        let proxy = proxy(&transport);

        let mut greeting = Value::map();
        greeting.insert("text", "hi");
        proxy.call("greetings/create", vec![greeting]).await.unwrap();

        assert_eq!(transport.recorded()[0].body, json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn synchronous_functions_fail_without_io() {
        let transport = MockTransport::new();
        let proxy = proxy(&transport);

        let err = proxy.call("greetings/now", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::NotAsync { ref path } if path == "/greetings/now"));
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn declared_errors_are_reconstructed() {
        let transport = MockTransport::new().with_response(
            url("/hello"),
            CallResponse::new(
                418,
                json!({
                    "error": "/errors/specialerror",
                    "message": "Goodbye cruel world!",
                    "info": 42,
                }),
            ),
        );
        let proxy = proxy(&transport);
        let special = proxy.error_class("/errors/SpecialError").unwrap().clone();

        let err = proxy.call("hello", vec![]).await.unwrap_err();
        assert_eq!(err.status(), Some(418));
        let app = err.app_error().unwrap();
        assert!(app.is(&special));
        assert!(app.is(proxy.errors().base()));
        assert_eq!(app.name(), "SpecialError");
        assert_eq!(app.message(), "Goodbye cruel world!");
        assert_eq!(app.field("info"), Some(&Value::from(42i64)));
        assert_eq!(app.code(), Some("/errors/specialerror"));
    }

    #[tokio::test]
    async fn unknown_codes_use_base_class() {
        let transport = MockTransport::new().with_response(
            url("/hello"),
            CallResponse::new(
                500,
                json!({
                    "error": "internal_error",
                    "message": "boom",
                    "stack": ["boom", "caused by: disk on fire"],
                }),
            ),
        );
        let proxy = proxy(&transport);

        let err = proxy.call("hello", vec![]).await.unwrap_err();
        let app = err.app_error().unwrap();
        assert_eq!(app.class(), proxy.errors().base());
        assert_eq!(app.code(), Some("internal_error"));
        assert_eq!(app.remote_stack(), ["boom", "caused by: disk on fire"]);
    }

    #[tokio::test]
    async fn bodies_without_envelope_are_unexpected() {
        let transport = MockTransport::new();
        let proxy = proxy(&transport);

        let err = proxy.call("hello", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse { status: 404, ref message } if message == "Not Found"
        ));
    }

    #[tokio::test]
    async fn success_bodies_must_be_json() {
        let transport = MockTransport::new().with_response(
            url("/hello"),
            CallResponse::from_text(200, "<html>sign in</html>"),
        );
        let err = proxy(&transport).call("hello", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse { status: 200, ref message } if message == "<html>sign in</html>"
        ));
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let transport = MockTransport::new().fail_with("connection refused");
        let err = proxy(&transport).call("hello", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn invalid_manifests_are_rejected() {
        let config = ClientConfig::new(ENDPOINT).unwrap();
        let err = Proxy::from_json(json!({"hello": [9]}), config).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn colliding_manifest_paths_are_rejected() {
        let config = ClientConfig::new(ENDPOINT).unwrap();
        let err = Proxy::from_json(json!({"Hello": [1, []], "hello": [1, []]}), config)
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
