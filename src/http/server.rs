//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay endpoint
//! - Wire up middleware (tracing, body limit, request ID)
//! - Own the response registry and the shared outbound client
//! - Serve until the shutdown broadcast fires

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::proxy::relay_handler;
use crate::lifecycle::shutdown;
use crate::registry::ResponseRegistry;
use crate::relay::RelayExecutor;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: RelayExecutor,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    registry: ResponseRegistry,
}

impl HttpServer {
    /// Create a server with a fresh registry sized from `config`.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let registry = ResponseRegistry::from_config(&config.registry);
        Self::with_registry(config, registry)
    }

    /// Create a server around an existing registry.
    pub fn with_registry(
        config: RelayConfig,
        registry: ResponseRegistry,
    ) -> Result<Self, reqwest::Error> {
        let executor = RelayExecutor::new(&config.upstream, registry.clone())?;
        let router = Self::build_router(&config, AppState { executor });

        Ok(Self {
            router,
            config,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let body_limit = match config.listener.max_body_bytes {
            Some(max) => DefaultBodyLimit::max(max),
            None => DefaultBodyLimit::disable(),
        };

        Router::new()
            .route("/proxy", post(relay_handler))
            .with_state(state)
            .layer(body_limit)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Router clone, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &ResponseRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_timeout_secs = ?self.config.upstream.timeout_secs,
            registry_max_entries = ?self.registry.max_entries(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!(stored_bodies = self.registry.len(), "HTTP server stopped");
        Ok(())
    }
}
