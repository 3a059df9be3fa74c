//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route blocks, checked in order; the first matching prefix wins.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// One route block: a path prefix and the rules for invoking functions under it.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    /// Path prefix this block maps to (e.g. "/lambda/").
    pub path: String,

    /// Optional qualifier (version or alias) sent with every invocation.
    pub qualifier: Option<String>,

    /// Function name include rules. Prefix and suffix `*` globs are supported.
    /// Empty means every name is allowed unless excluded.
    pub include: Vec<String>,

    /// Function name exclude rules, applied after `include`.
    pub exclude: Vec<String>,

    /// Prepended to the parsed function name after filtering.
    pub name_prepend: String,

    /// Appended to the parsed function name after filtering.
    pub name_append: String,

    /// Invoke this function for every request under `path`.
    /// When set, the name is not parsed from the URL and `include`/`exclude`
    /// are ignored.
    pub single: Option<String>,

    /// Remove `path` (and the function segment unless `single` is set) from
    /// the path sent in the request envelope. With `path = "/api/"` a request
    /// to `/api/hello/foo` is forwarded with path `/foo`.
    pub strip_path_prefix: bool,

    /// Headers injected into the envelope. Values may contain placeholders.
    pub upstream_headers: BTreeMap<String, Vec<String>>,

    /// AWS client settings. Unset fields fall back to the SDK defaults.
    pub aws: AwsSettings,

    /// Plain HTTP invoke endpoint. When set, the AWS SDK is not used.
    pub endpoint: Option<String>,
}

impl RouteConfig {
    /// Create a route config for `path` with every other field defaulted.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// AWS settings for one route. Opaque to routing; consumed by the invoker.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AwsSettings {
    /// Access key id. If omitted, the SDK credential chain is used.
    pub access_key: Option<String>,

    /// Secret access key, required together with `access_key`.
    pub secret_key: Option<String>,

    /// Region. If omitted, the SDK region chain is used.
    pub region: Option<String>,

    /// Custom service endpoint (e.g. LocalStack).
    pub endpoint_url: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body captured into an envelope, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            // Synchronous Lambda payloads are capped at 6MB.
            max_body_bytes: 6 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[routes]]
            path = "/lambda/"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.routes, vec![RouteConfig::new("/lambda/")]);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_full_route_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [observability]
            log_format = "json"

            [[routes]]
            path = "/api/"
            qualifier = "prod"
            include = ["foo*", "some-other"]
            exclude = ["*blah*"]
            name_prepend = "apex-foo_"
            name_append = "_suffix_here"
            strip_path_prefix = true

            [routes.upstream_headers]
            "X-Real-IP" = ["{remote}"]

            [routes.aws]
            region = "us-west-1"
            "#,
        )
        .unwrap();

        let route = &config.routes[0];
        assert_eq!(route.qualifier.as_deref(), Some("prod"));
        assert_eq!(route.include, vec!["foo*", "some-other"]);
        assert_eq!(route.exclude, vec!["*blah*"]);
        assert!(route.strip_path_prefix);
        assert_eq!(route.upstream_headers["X-Real-IP"], vec!["{remote}"]);
        assert_eq!(route.aws.region.as_deref(), Some("us-west-1"));
        assert_eq!(route.single, None);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
