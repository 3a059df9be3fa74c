//! Startup orchestration.
//!
//! # Responsibilities
//! - Build one invoker per route
//! - Compile routes in configuration order
//! - Assemble the gateway
//!
//! # Design Decisions
//! - Fail fast: a route whose invoker cannot be built stops startup
//! - Routes initialize in order, not concurrently

use thiserror::Error;

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::invoker::{build_invoker, InvokeError};
use crate::routing::{FunctionSelector, Route, Router};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route `{path}`: {source}")]
    Invoker {
        path: String,
        #[source]
        source: InvokeError,
    },
}

/// One-line description of a compiled route, for logs and `--check`.
pub fn describe_route(route: &Route) -> String {
    let target = match route.selector() {
        FunctionSelector::Single(name) => format!("single `{}`", name),
        FunctionSelector::Parsed {
            include,
            exclude,
            prepend,
            append,
        } => format!(
            "`{}<name>{}` include={:?} exclude={:?}",
            prepend, append, include, exclude
        ),
    };
    match route.qualifier() {
        Some(q) => format!("{} -> {} qualifier={}", route.path_prefix(), target, q),
        None => format!("{} -> {}", route.path_prefix(), target),
    }
}

/// Build the gateway for a validated config.
pub async fn build_gateway(config: &GatewayConfig) -> Result<Gateway, StartupError> {
    let mut routes = Vec::with_capacity(config.routes.len());

    for route_config in &config.routes {
        let invoker = build_invoker(route_config)
            .await
            .map_err(|source| StartupError::Invoker {
                path: route_config.path.clone(),
                source,
            })?;

        let route = Route::new(route_config, invoker);
        tracing::info!(route = %describe_route(&route), "Route configured");
        routes.push(route);
    }

    Ok(Gateway::new(Router::new(routes), config.limits.max_body_bytes))
}
