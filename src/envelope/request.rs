//! Request envelope encoding.
//!
//! # Responsibilities
//! - Capture the request head (method, path, query, host, protocol, headers)
//! - Read the body once and carry it as a string
//! - Rewrite the recorded path when a route strips its prefix

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{header, request::Parts, Request};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Type tag carried by every request envelope.
pub const REQUEST_TYPE: &str = "HTTPJSON-REQ";

/// The JSON object sent to a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: RequestMeta,
    pub body: String,
}

/// Request head as recorded in the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub method: String,
    /// Percent-decoded request path.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    pub host: String,
    pub proto: String,
    /// Lower-cased header names mapped to their values in arrival order.
    pub headers: BTreeMap<String, Vec<String>>,
}

impl RequestMeta {
    /// Record the head of a request.
    pub fn from_parts(parts: &Parts) -> Self {
        let host = parts
            .uri
            .authority()
            .map(|a| a.to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(header::HOST)
                    .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned())
            })
            .unwrap_or_default();

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            method: parts.method.to_string(),
            path: decode_path(parts.uri.path()),
            query: parts.uri.query().unwrap_or_default().to_string(),
            host,
            proto: format!("{:?}", parts.version),
            headers,
        }
    }

    /// Insert or overwrite a header; the name is lower-cased.
    pub fn set_header(&mut self, name: &str, values: Vec<String>) {
        self.headers.insert(name.to_ascii_lowercase(), values);
    }
}

impl RequestEnvelope {
    /// Build an envelope from a request head and its fully read body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        Self {
            kind: REQUEST_TYPE.to_string(),
            meta: RequestMeta::from_parts(parts),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Serialize to the wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GatewayError> {
        serde_json::to_vec(self).map_err(GatewayError::Encode)
    }
}

/// Percent-decode a request path.
///
/// Routing, function names and the envelope all work on the decoded form.
/// Malformed escapes are kept as written; invalid UTF-8 is replaced.
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Read the body (up to `limit` bytes) and encode the whole request.
///
/// Returns the head alongside the envelope so callers can keep using it.
pub async fn encode_request(
    request: Request<Body>,
    limit: usize,
) -> Result<(Parts, RequestEnvelope), GatewayError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(GatewayError::Body)?;
    let envelope = RequestEnvelope::from_parts(&parts, &bytes);
    Ok((parts, envelope))
}

/// Compute the path recorded in the envelope for a route.
///
/// With stripping enabled, the prefix removed is the route prefix alone for
/// single-function routes, or the route prefix (with a trailing `/`)
/// followed by the function name otherwise. The result always starts with
/// `/`. Paths that do not start with that prefix are returned unchanged.
pub fn path_for_metadata(
    path: &str,
    route_prefix: &str,
    function_name: &str,
    strip_path_prefix: bool,
    is_single: bool,
) -> String {
    if !strip_path_prefix {
        return path.to_string();
    }

    let mut prefix = route_prefix.to_string();
    if !is_single {
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        prefix.push_str(function_name);
    }

    match path.strip_prefix(prefix.as_str()) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) => format!("/{}", rest),
        None => path.to_string(),
    }
}
