//! Invocation over the plain HTTP invoke API.
//!
//! Targets services that expose the Lambda invoke path without request
//! signing: `POST /2015-03-31/functions/{name}/invocations`.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{InvokeError, Invoker};

const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

/// Everything except RFC 3986 unreserved characters is escaped in the
/// function name segment and the qualifier value.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Invoker that POSTs payloads to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    endpoint: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpInvoker {
    /// Create an invoker for `endpoint` (e.g. `http://127.0.0.1:3001`).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, InvokeError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        endpoint
            .parse::<Uri>()
            .map_err(|e| InvokeError::Unavailable(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { endpoint, client })
    }

    /// Endpoint this invoker posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn invocation_uri(&self, function_name: &str, qualifier: Option<&str>) -> String {
        let mut uri = format!(
            "{}/2015-03-31/functions/{}/invocations",
            self.endpoint,
            utf8_percent_encode(function_name, COMPONENT)
        );
        if let Some(qualifier) = qualifier {
            uri.push_str("?Qualifier=");
            uri.extend(utf8_percent_encode(qualifier, COMPONENT));
        }
        uri
    }
}

#[async_trait]
impl Invoker for HttpInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Bytes,
        qualifier: Option<&str>,
    ) -> Result<Bytes, InvokeError> {
        let uri = self.invocation_uri(function_name, qualifier);
        let request = Request::builder()
            .method(Method::POST)
            .uri(&uri)
            .header("content-type", "application/json")
            .body(Full::new(payload))
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        tracing::debug!(uri = %uri, "Posting invocation");

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .map(|v| v.to_str().unwrap_or("Unhandled").to_string());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(kind) = function_error {
            return Err(InvokeError::Function { kind, payload: body });
        }

        Ok(body)
    }
}
