//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the resolved router with middleware (trace, timeout, limits, request ID)
//! - Put method override in front of routing
//! - Bind server to listener and drain on shutdown

use std::time::Duration;

use axum::{body::Body, extract::Request, http::Request as HttpRequest, response::Response, Router};
use tokio::net::TcpListener;
use tower::{Layer, ServiceExt as _};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::method_override::{MethodOverride, MethodOverrideLayer};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::lifecycle::Shutdown;
use crate::resolver::Application;

/// HTTP server for a resolved application.
pub struct HttpServer {
    service: MethodOverride<Router>,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `app`.
    pub fn new(config: AppConfig, app: Application) -> Self {
        let router = Self::build_router(&config, app.into_router());
        let service = MethodOverrideLayer::from_config(&config.method_override).layer(router);
        Self { service, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, router: Router) -> Router {
        router
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &HttpRequest<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = request.request_id().unwrap_or("-"),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The full request pipeline, for driving without a socket.
    pub fn service(&self) -> MethodOverride<Router> {
        self.service.clone()
    }

    /// Answer one request.
    pub async fn handle(&self, request: Request) -> Response {
        match self.service().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            method_override = self.config.method_override.enabled,
            "HTTP server starting"
        );

        let mut stop = shutdown.subscribe();
        let app = axum::ServiceExt::<Request>::into_make_service(self.service);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
