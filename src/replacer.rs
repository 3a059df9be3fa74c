//! Placeholder substitution for injected upstream headers.
//!
//! Supported placeholders: `{method}`, `{path}`, `{query}`, `{uri}`,
//! `{host}`, `{hostname}`, `{proto}`, `{scheme}`, `{remote}`,
//! `{request_id}` and `{>Header-Name}` for any request header.
//! `{path}` is percent-decoded; `{uri}` is the raw request target.
//! Unknown placeholders are left as written.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request};

use crate::envelope::decode_path;
use crate::http::X_REQUEST_ID;

/// Capability that expands a header template.
pub trait Replacer: Send + Sync {
    fn replace(&self, template: &str) -> String;
}

/// Replacer that returns templates unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReplacer;

impl Replacer for NoopReplacer {
    fn replace(&self, template: &str) -> String {
        template.to_string()
    }
}

/// Replacer bound to one inbound request.
#[derive(Debug, Clone)]
pub struct RequestReplacer {
    method: String,
    path: String,
    query: String,
    uri: String,
    host: String,
    proto: String,
    scheme: String,
    remote: String,
    headers: HeaderMap,
}

impl RequestReplacer {
    /// Capture the values placeholders may refer to.
    ///
    /// The remote address comes from axum's `ConnectInfo` extension when the
    /// server was started with connect info.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request.uri();
        let host = uri
            .authority()
            .map(|a| a.to_string())
            .or_else(|| {
                request
                    .headers()
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_default();
        let remote = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();

        Self {
            method: request.method().to_string(),
            path: decode_path(uri.path()),
            query: uri.query().unwrap_or_default().to_string(),
            uri: uri
                .path_and_query()
                .map(|pq| pq.to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            host,
            proto: format!("{:?}", request.version()),
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
            remote,
            headers: request.headers().clone(),
        }
    }

    fn header(&self, name: &str) -> String {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(name) = key.strip_prefix('>') {
            return Some(self.header(name));
        }

        let value = match key {
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "query" => self.query.clone(),
            "uri" => self.uri.clone(),
            "host" => self.host.clone(),
            "hostname" => match self.host.rsplit_once(':') {
                Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name.to_string(),
                _ => self.host.clone(),
            },
            "proto" => self.proto.clone(),
            "scheme" => self.scheme.clone(),
            "remote" => self.remote.clone(),
            "request_id" => self.header(X_REQUEST_ID),
            _ => return None,
        };
        Some(value)
    }
}

impl Replacer for RequestReplacer {
    fn replace(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = &after[..end];
            match self.lookup(key) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}
