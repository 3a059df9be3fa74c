//! Per-request failures.
//!
//! Anything here ends the request with `500 Internal Server Error`. Route
//! misses and rejected function names are not errors; they fall through
//! to the next handler instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::ReplyError;
use crate::invoker::InvokeError;

/// Errors raised while handling a routed request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request body could not be read (I/O error or over the limit).
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// The request envelope could not be serialized.
    #[error("failed to encode request envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// The invoker failed.
    #[error("invocation of `{function}` failed: {source}")]
    Invoke {
        function: String,
        #[source]
        source: InvokeError,
    },

    /// The function declared the reply envelope but broke its shape.
    #[error("invalid reply from `{function}`: {source}")]
    Reply {
        function: String,
        #[source]
        source: ReplyError,
    },
}

impl GatewayError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Body(_) => "body",
            GatewayError::Encode(_) => "encode",
            GatewayError::Invoke { .. } => "invoke",
            GatewayError::Reply { .. } => "reply",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, kind = self.kind(), "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_error_display() {
        let err = GatewayError::Invoke {
            function: "pre-user".into(),
            source: InvokeError::Status {
                status: 502,
                body: Bytes::new(),
            },
        };
        assert_eq!(
            err.to_string(),
            "invocation of `pre-user` failed: invoke API returned status 502"
        );
        assert_eq!(err.kind(), "invoke");
    }

    #[test]
    fn test_into_response_is_internal_error() {
        let err = GatewayError::Reply {
            function: "f".into(),
            source: ReplyError::InvalidStatus(7),
        };
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
