//! Per-request orchestration.
//!
//! # Data Flow
//! ```text
//! request
//!     → Router::match_path          (miss → next handler)
//!     → Route::resolve              (rejected → next handler)
//!     → encode_request + prepare_meta
//!     → serialize envelope
//!     → Route::invoke
//!     → decode_reply → response     (never falls through after invoking)
//! ```
//!
//! # Design Decisions
//! - Misses and rejected names are not errors; another handler may serve them
//! - Every failure after a route is chosen ends the request with a 500
//! - One invocation per request, no retries

use std::time::Instant;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::envelope::{decode_path, decode_reply, encode_request, DecodedReply};
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::replacer::Replacer;
use crate::routing::{ResolvedFunction, Route, Router};

/// Capability invoked for requests the gateway does not serve.
#[async_trait]
pub trait NextHandler: Send {
    async fn call(self, request: Request<Body>) -> Response;
}

#[async_trait]
impl NextHandler for axum::middleware::Next {
    async fn call(self, request: Request<Body>) -> Response {
        self.run(request).await
    }
}

/// What the gateway decided to do with a request.
#[derive(Debug)]
pub enum Dispatch {
    /// A function was invoked; this is its decoded reply.
    Reply(DecodedReply),
    /// No route or function applies; the request is handed back untouched.
    Fallthrough(Request<Body>),
}

/// Routes requests to remote functions.
#[derive(Debug)]
pub struct Gateway {
    router: Router,
    max_body_bytes: usize,
}

impl Gateway {
    pub fn new(router: Router, max_body_bytes: usize) -> Self {
        Self {
            router,
            max_body_bytes,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Serve `request`, handing it to `next` when no function applies.
    pub async fn handle<N: NextHandler>(
        &self,
        request: Request<Body>,
        replacer: &dyn Replacer,
        next: N,
    ) -> Response {
        match self.dispatch(request, replacer).await {
            Ok(Dispatch::Reply(reply)) => reply.into_response(),
            Ok(Dispatch::Fallthrough(request)) => next.call(request).await,
            Err(err) => err.into_response(),
        }
    }

    /// Decide on and, if applicable, perform the invocation for `request`.
    ///
    /// Route lookup and name filtering see the percent-decoded path.
    pub async fn dispatch(
        &self,
        request: Request<Body>,
        replacer: &dyn Replacer,
    ) -> Result<Dispatch, GatewayError> {
        let path = decode_path(request.uri().path());

        let Some(route) = self.router.match_path(&path) else {
            tracing::trace!(path = %path, "No route matched");
            return Ok(Dispatch::Fallthrough(request));
        };

        let Some(function) = route.resolve(&path) else {
            tracing::debug!(path = %path, route = %route.path_prefix(), "Function rejected");
            metrics::record_fallthrough(route.path_prefix());
            return Ok(Dispatch::Fallthrough(request));
        };

        let start = Instant::now();
        let reply = match self.invoke_route(route, &function, request, replacer).await {
            Ok(reply) => reply,
            Err(err) => {
                metrics::record_error(route.path_prefix(), err.kind());
                return Err(err);
            }
        };

        metrics::record_invocation(route.path_prefix(), reply.status.as_u16(), reply.passthrough, start);
        tracing::info!(
            function = %function.invoke_name,
            status = reply.status.as_u16(),
            passthrough = reply.passthrough,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Function replied"
        );

        Ok(Dispatch::Reply(reply))
    }

    async fn invoke_route(
        &self,
        route: &Route,
        function: &ResolvedFunction,
        request: Request<Body>,
        replacer: &dyn Replacer,
    ) -> Result<DecodedReply, GatewayError> {
        let (_parts, mut envelope) = encode_request(request, self.max_body_bytes).await?;
        route.prepare_meta(&mut envelope.meta, function, replacer);
        let payload = Bytes::from(envelope.to_bytes()?);

        tracing::debug!(
            route = %route.path_prefix(),
            function = %function.invoke_name,
            qualifier = ?route.qualifier(),
            payload_bytes = payload.len(),
            "Invoking function"
        );

        let raw = route
            .invoke(&function.invoke_name, payload)
            .await
            .map_err(|source| GatewayError::Invoke {
                function: function.invoke_name.clone(),
                source,
            })?;

        decode_reply(raw).map_err(|source| GatewayError::Reply {
            function: function.invoke_name.clone(),
            source,
        })
    }
}
