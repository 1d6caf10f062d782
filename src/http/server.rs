//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the fetch pipeline once and share it between both services
//! - Create the axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::availability::AvailabilityService;
use crate::cache::{build_store, CacheStore};
use crate::config::BffConfig;
use crate::error::{BffError, BffResult};
use crate::http::request::{propagate_request_id_layer, request_id_from, set_request_id_layer};
use crate::http::{health, quote, search};
use crate::pipeline::FetchPipeline;
use crate::quoting::QuoteService;
use crate::supplier::Upstream;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FetchPipeline>,
    pub availability: AvailabilityService,
    pub quotes: QuoteService,
    pub upstream_mode: &'static str,
}

impl AppState {
    pub fn new(config: &BffConfig, store: Arc<dyn CacheStore>, upstream: Upstream) -> Self {
        let pipeline = Arc::new(FetchPipeline::from_config(config, store));
        Self {
            availability: AvailabilityService::new(
                pipeline.clone(),
                upstream.clone(),
                Duration::from_secs(config.cache.search_ttl_secs),
            ),
            quotes: QuoteService::new(
                pipeline.clone(),
                upstream.clone(),
                Duration::from_secs(config.cache.quote_ttl_secs),
            ),
            upstream_mode: upstream.mode(),
            pipeline,
        }
    }
}

/// The BFF's HTTP server.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: BffConfig,
}

impl HttpServer {
    /// Create a server with the configured cache store and supplier.
    pub fn new(config: BffConfig) -> BffResult<Self> {
        let store = build_store(&config.cache)
            .map_err(|e| BffError::Unknown(format!("unable to build cache store: {}", e)))?;
        let upstream = Upstream::from_config(&config.supplier)?;
        Ok(Self::with_parts(config, store, upstream))
    }

    /// Create a server around an explicit store and upstream.
    pub fn with_parts(config: BffConfig, store: Arc<dyn CacheStore>, upstream: Upstream) -> Self {
        let state = AppState::new(&config, store, upstream);
        let router = Self::build_router(state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the axum router. Layers run top to bottom on the way in.
    ///
    /// The request deadline lives in the fetch pipeline rather than in a
    /// timeout layer, so an expired request still reaches the breaker and is
    /// answered with the error envelope.
    fn build_router(state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request_id_from(request.headers()).unwrap_or_default();
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id
                )
            }))
            .layer(propagate_request_id_layer());

        Router::new()
            .route("/v1/hotels/search", get(search::search_hotels))
            .route("/v1/hotels/quote", post(quote::create_quote))
            .route("/health", get(health::health))
            .with_state(state)
            .layer(middleware)
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &BffConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            supplier = %self.state.pipeline.supplier(),
            mode = self.state.upstream_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
