//! Remote function invocation.
//!
//! # Data Flow
//! ```text
//! gateway (function name, envelope bytes, qualifier)
//!     → Invoker::invoke
//!         → http.rs   (unsigned Lambda-compatible invoke API, e.g. local emulators)
//!         → lambda.rs (AWS Lambda through the official SDK)
//!     → raw reply bytes back to the envelope decoder
//! ```
//!
//! # Design Decisions
//! - One invoker per route, bound when the route is built and never swapped
//! - Implementations must tolerate concurrent calls; any pooling is theirs
//! - No retries here or in the gateway: function idempotency is unknown

pub mod http;
#[cfg(feature = "aws")]
pub mod lambda;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::RouteConfig;

pub use self::http::HttpInvoker;
#[cfg(feature = "aws")]
pub use self::lambda::LambdaInvoker;

/// Errors returned by an [`Invoker`].
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The call never produced a reply (connection, signing, SDK failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The invoke API answered with a non-success status.
    #[error("invoke API returned status {status}")]
    Status { status: u16, body: Bytes },

    /// The function ran but raised an error.
    #[error("function error ({kind})")]
    Function { kind: String, payload: Bytes },

    /// The invoker could not be constructed from its configuration.
    #[error("invoker unavailable: {0}")]
    Unavailable(String),
}

/// Capability that calls a remote function.
#[async_trait]
pub trait Invoker: Send + Sync + std::fmt::Debug {
    /// Invoke `function_name` with `payload`, optionally pinned to `qualifier`.
    async fn invoke(
        &self,
        function_name: &str,
        payload: Bytes,
        qualifier: Option<&str>,
    ) -> Result<Bytes, InvokeError>;
}

/// Build the invoker a route config asks for.
///
/// A route with an `endpoint` talks plain HTTP to it; otherwise the AWS SDK
/// is used with the route's optional static credentials and region.
pub async fn build_invoker(route: &RouteConfig) -> Result<Arc<dyn Invoker>, InvokeError> {
    if let Some(endpoint) = &route.endpoint {
        return Ok(Arc::new(HttpInvoker::new(endpoint)?));
    }

    #[cfg(feature = "aws")]
    {
        Ok(Arc::new(LambdaInvoker::from_settings(&route.aws).await))
    }

    #[cfg(not(feature = "aws"))]
    {
        Err(InvokeError::Unavailable(format!(
            "route {} has no endpoint and AWS support is not compiled in",
            route.path
        )))
    }
}
