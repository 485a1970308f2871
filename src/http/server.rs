//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Build the per-request context and dispatch into the proxy pipeline
//! - Swap in reloaded configuration without restarting
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::http::context::RequestContext;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;
use crate::proxy;
use crate::routing::{HostRouter, PathClassifier};
use crate::upstream::UpstreamClient;

/// Everything derived from one configuration snapshot.
pub struct InnerState {
    pub config: ProxyConfig,
    pub router: HostRouter,
    pub classifier: PathClassifier,
    pub client: UpstreamClient,
}

impl InnerState {
    pub fn build(config: ProxyConfig) -> Result<Self> {
        let router = HostRouter::from_config(&config.routes, &config.upstream);
        let client = UpstreamClient::new(&config.upstream, &config.timeouts)?;

        Ok(Self {
            config,
            router,
            classifier: PathClassifier::default(),
            client,
        })
    }
}

/// Application state injected into handlers.
///
/// Each request loads one snapshot and uses it to completion, so a reload
/// never changes routing halfway through a request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<ArcSwap<InnerState>>,
}

impl AppState {
    pub fn new(inner: InnerState) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
        }
    }

    pub fn snapshot(&self) -> Arc<InnerState> {
        self.inner.load_full()
    }

    /// Replace the active snapshot.
    pub fn reload(&self, config: ProxyConfig) -> Result<()> {
        let inner = InnerState::build(config)?;
        self.inner.store(Arc::new(inner));
        Ok(())
    }
}

/// HTTP server for the registry proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let state = AppState::new(InnerState::build(config)?);
        let router = Self::build_router(request_timeout, state.clone());

        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, applying configuration
    /// updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let routes = config.routes.len();
                match state.reload(config) {
                    Ok(()) => tracing::info!(routes, "Configuration reloaded"),
                    Err(e) => tracing::error!(error = %e, "Failed to apply reloaded configuration"),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method, every path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let inner = state.snapshot();

    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let ctx = RequestContext::new(
        request_id,
        request.uri(),
        request.headers(),
        &inner.router,
        &inner.config.upstream,
    );
    let method = request.method().to_string();

    tracing::debug!(
        request_id = %ctx.request_id,
        method = %method,
        path = %request.uri().path(),
        label = %ctx.label,
        upstream = %ctx.route.upstream_host,
        disguised = ctx.route.disguised,
        "Proxying request"
    );

    let response = match proxy::handle(&inner, &ctx, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(&method, response.status().as_u16(), &ctx.route.upstream_host, start_time);
    response
}
