//! Response rendering.
//!
//! # Responsibilities
//! - Turn a decoded function reply into an HTTP response
//! - Provide the end-of-chain handler for requests nothing served

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::envelope::DecodedReply;

impl IntoResponse for DecodedReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Last handler in the chain: nothing matched.
pub async fn no_route() -> Response {
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}
