//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the directive parser handle syntax)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate or malformed route prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};

/// A single semantic problem in a loaded config.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("route #{index}: path must not be empty")]
    EmptyPath { index: usize },

    #[error("route `{path}`: path must start with `/`")]
    RelativePath { path: String },

    #[error("route `{path}`: duplicate path")]
    DuplicatePath { path: String },

    #[error("route `{path}`: empty {list} rule")]
    EmptyRule { path: String, list: &'static str },

    #[error("route `{path}`: aws access key and secret key must be set together")]
    PartialCredentials { path: String },

    #[error("route `{path}`: {field} `{value}` is not an http(s) URL")]
    InvalidUrl {
        path: String,
        field: &'static str,
        value: String,
    },
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn validate_route(route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    let path = route.path.clone();

    for (list, rules) in [("include", &route.include), ("exclude", &route.exclude)] {
        if rules.iter().any(|r| r.is_empty()) {
            errors.push(ValidationError::EmptyRule {
                path: path.clone(),
                list,
            });
        }
    }

    if route.aws.access_key.is_some() != route.aws.secret_key.is_some() {
        errors.push(ValidationError::PartialCredentials { path: path.clone() });
    }

    let urls = [
        ("endpoint", route.endpoint.as_deref()),
        ("aws.endpoint_url", route.aws.endpoint_url.as_deref()),
    ];
    for (field, value) in urls {
        if let Some(value) = value {
            if !is_http_url(value) {
                errors.push(ValidationError::InvalidUrl {
                    path: path.clone(),
                    field,
                    value: value.to_string(),
                });
            }
        }
    }
}

/// Validate a config, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyPath { index });
        } else if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                path: route.path.clone(),
            });
        }
        if !route.path.is_empty() && !seen.insert(route.path.as_str()) {
            errors.push(ValidationError::DuplicatePath {
                path: route.path.clone(),
            });
        }
        validate_route(route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
