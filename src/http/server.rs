//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway in front of the fallback chain
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::no_route;
use crate::lifecycle::ShutdownSignal;
use crate::replacer::RequestReplacer;

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    gateway: Arc<Gateway>,
}

impl GatewayServer {
    /// Create a new HTTP server around a gateway.
    pub fn new(gateway: Gateway, config: &GatewayConfig) -> Self {
        let gateway = Arc::new(gateway);
        let router = Self::build_router(gateway.clone(), config);
        Self { router, gateway }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Requests the gateway does not take continue to the fallback, which
    /// answers 404.
    #[allow(deprecated)]
    pub fn build_router(gateway: Arc<Gateway>, config: &GatewayConfig) -> Router {
        Router::new()
            .fallback(no_route)
            .layer(middleware::from_fn_with_state(gateway, gateway_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Router with all layers, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.gateway.router().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway middleware: the axum `Next` is the fallthrough handler.
async fn gateway_middleware(
    State(gateway): State<Arc<Gateway>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
        "Gateway request"
    );

    let replacer = RequestReplacer::from_request(&request);
    gateway.handle(request, &replacer, next).await
}
