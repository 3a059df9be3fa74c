//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route and outcome
//!   (`invoked`, `fallthrough`, `error`); errors carry `kind`
//!   (`body`, `encode`, `invoke`, `reply`)
//! - `gateway_invocation_duration_seconds` (histogram): invoke + decode latency
//! - `gateway_passthrough_replies_total` (counter): replies without the envelope type
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// A function was invoked and its reply decoded.
pub fn record_invocation(route: &str, status: u16, passthrough: bool, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "outcome" => "invoked",
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_invocation_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());

    if passthrough {
        ::metrics::counter!("gateway_passthrough_replies_total", "route" => route.to_string())
            .increment(1);
    }
}

/// A route matched but its function name was rejected.
pub fn record_fallthrough(route: &str) {
    ::metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "outcome" => "fallthrough"
    )
    .increment(1);
}

/// A routed request failed.
pub fn record_error(route: &str, kind: &'static str) {
    ::metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "outcome" => "error",
        "kind" => kind
    )
    .increment(1);
}
