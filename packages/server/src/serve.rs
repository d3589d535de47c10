//! Binding and running a service.

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServeConfig;
use crate::error::Result;
use crate::service::Service;

/// The service's router as [`serve`] runs it: mounted under the base URL,
/// with request tracing and, if enabled, permissive CORS.
pub fn app(service: &Service, config: &ServeConfig) -> Router {
    let router = service
        .clone()
        .with_body_limit(config.body_limit)
        .nest(&config.base_url);

    let router = if config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Bind `config.addr()` and serve until the process ends.
pub async fn serve(service: Service, config: ServeConfig) -> Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve_listener(listener, &service, &config, std::future::pending()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_listener(
    listener: TcpListener,
    service: &Service,
    config: &ServeConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, base_url = %config.base_url, "serving");

    axum::serve(listener, app(service, config))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(%addr, "stopped serving");
    Ok(())
}
