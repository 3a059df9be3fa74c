//! Reply envelope decoding.
//!
//! # Design Decisions
//! - Replies that do not declare `"type": "HTTPJSON-REP"` (including
//!   non-JSON payloads) pass through verbatim as a 200 JSON response
//! - Once the type matches, shape errors are reported, never coerced
//! - A missing or non-positive status means 200

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type tag a function must set to use the reply contract.
pub const REPLY_TYPE: &str = "HTTPJSON-REP";

/// Errors decoding a reply that declared the envelope type.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Field types do not match the envelope (e.g. a header value that is
    /// not a list of strings).
    #[error("malformed reply envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("reply status {0} is not a valid HTTP status")]
    InvalidStatus(i64),

    #[error("reply header name `{0}` is invalid")]
    InvalidHeaderName(String),

    #[error("reply header `{name}` has an invalid value")]
    InvalidHeaderValue { name: String },
}

/// The JSON object a function may return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReplyMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Response head requested by a function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Vec<String>>>,
}

impl ReplyEnvelope {
    /// A reply with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: REPLY_TYPE.to_string(),
            meta: Some(ReplyMeta {
                status: Some(i64::from(status)),
                headers: None,
            }),
            body: Some(body.into()),
        }
    }

    /// Append a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .get_or_insert_with(ReplyMeta::default)
            .headers
            .get_or_insert_with(BTreeMap::new)
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// HTTP response parts produced from a function reply.
#[derive(Debug, Clone)]
pub struct DecodedReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// True when the raw payload was returned as-is.
    pub passthrough: bool,
}

impl DecodedReply {
    fn passthrough(raw: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status: StatusCode::OK,
            headers,
            body: raw,
            passthrough: true,
        }
    }
}

fn declares_envelope(value: &serde_json::Value) -> bool {
    value.get("type").and_then(|t| t.as_str()) == Some(REPLY_TYPE)
}

fn resolve_status(status: Option<i64>) -> Result<StatusCode, ReplyError> {
    match status {
        Some(code) if code > 0 => u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .ok_or(ReplyError::InvalidStatus(code)),
        _ => Ok(StatusCode::OK),
    }
}

/// Turn raw function output into response parts.
pub fn decode_reply(raw: Bytes) -> Result<DecodedReply, ReplyError> {
    let value: serde_json::Value = match serde_json::from_slice(&raw) {
        Ok(value) if declares_envelope(&value) => value,
        _ => return Ok(DecodedReply::passthrough(raw)),
    };

    let envelope: ReplyEnvelope = serde_json::from_value(value)?;
    let meta = envelope.meta.unwrap_or_default();

    let status = resolve_status(meta.status)?;

    let mut headers = HeaderMap::new();
    for (name, values) in meta.headers.unwrap_or_default() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ReplyError::InvalidHeaderName(name.clone()))?;
        for value in values {
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| ReplyError::InvalidHeaderValue { name: name.clone() })?;
            headers.append(header_name.clone(), header_value);
        }
    }

    Ok(DecodedReply {
        status,
        headers,
        body: Bytes::from(envelope.body.unwrap_or_default()),
        passthrough: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Result<DecodedReply, ReplyError> {
        decode_reply(Bytes::from(raw.to_string()))
    }

    #[test]
    fn test_passthrough_payloads() {
        for raw in [
            r#"{ "name": "bob"}"#,
            "plain text, not json",
            r#"{"type": "HTTPJSON-REQ", "body": "x"}"#,
            r#"{"type": "httpjson-rep", "body": "x"}"#,
            r#"["HTTPJSON-REP"]"#,
            "",
        ] {
            let reply = decode(raw).unwrap();
            assert!(reply.passthrough, "{}", raw);
            assert_eq!(reply.status, StatusCode::OK);
            assert_eq!(reply.body, raw.as_bytes());
            assert_eq!(reply.headers[header::CONTENT_TYPE], "application/json");
        }
    }

    #[test]
    fn test_envelope_reply() {
        let reply = decode(
            r#"{"type":"HTTPJSON-REP","meta":{"status":201,"headers":{"X-Thing":["a","b"],"content-type":["text/plain"]}},"body":"created"}"#,
        )
        .unwrap();

        assert!(!reply.passthrough);
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body, "created");
        let things: Vec<_> = reply.headers.get_all("x-thing").iter().collect();
        assert_eq!(things, vec!["a", "b"]);
        assert_eq!(reply.headers[header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_status_defaults() {
        for raw in [
            r#"{"type":"HTTPJSON-REP","body":"x"}"#,
            r#"{"type":"HTTPJSON-REP","meta":{},"body":"x"}"#,
            r#"{"type":"HTTPJSON-REP","meta":{"status":0},"body":"x"}"#,
            r#"{"type":"HTTPJSON-REP","meta":{"status":-3},"body":"x"}"#,
            r#"{"type":"HTTPJSON-REP","meta":null,"body":"x"}"#,
        ] {
            let reply = decode(raw).unwrap();
            assert_eq!(reply.status, StatusCode::OK, "{}", raw);
            assert!(reply.headers.is_empty());
        }
    }

    #[test]
    fn test_missing_body_is_empty() {
        let reply = decode(r#"{"type":"HTTPJSON-REP","meta":{"status":204}}"#).unwrap();
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert!(reply.body.is_empty());
    }

    #[test]
    fn test_malformed_header_values_are_errors() {
        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"headers":{"x-a":"single"}},"body":""}"#)
            .unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));

        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"headers":{"x-a":[1,2]}},"body":""}"#)
            .unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));

        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"headers":{"bad name":["v"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, ReplyError::InvalidHeaderName(_)));

        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"headers":{"x-a":["line\nbreak"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, ReplyError::InvalidHeaderValue { .. }));
    }

    #[test]
    fn test_invalid_status() {
        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"status":70000}}"#).unwrap_err();
        assert!(matches!(err, ReplyError::InvalidStatus(70000)));
        let err = decode(r#"{"type":"HTTPJSON-REP","meta":{"status":42}}"#).unwrap_err();
        assert!(matches!(err, ReplyError::InvalidStatus(42)));
    }

    #[test]
    fn test_builder_round_trips_through_decoder() {
        let raw = serde_json::to_vec(&ReplyEnvelope::new(404, "missing").with_header("X-Why", "gone"))
            .unwrap();
        let reply = decode_reply(Bytes::from(raw)).unwrap();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body, "missing");
        assert_eq!(reply.headers["x-why"], "gone");
    }
}
