//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;

use lambda_gateway::config::{GatewayConfig, RouteConfig};
use lambda_gateway::invoker::{InvokeError, Invoker};
use lambda_gateway::routing::{Route, Router as RouteTable};
use lambda_gateway::{Gateway, GatewayServer};

/// One recorded invocation.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Call {
    pub name: String,
    pub payload: Bytes,
    pub qualifier: Option<String>,
}

/// Invoker that records calls and returns a fixed reply.
#[derive(Debug)]
pub struct FakeInvoker {
    reply: Bytes,
    calls: Mutex<Vec<Call>>,
}

impl FakeInvoker {
    pub fn replying(reply: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invoker for FakeInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Bytes,
        qualifier: Option<&str>,
    ) -> Result<Bytes, InvokeError> {
        self.calls.lock().unwrap().push(Call {
            name: function_name.to_string(),
            payload,
            qualifier: qualifier.map(str::to_string),
        });
        Ok(self.reply.clone())
    }
}

/// Full axum app for `routes`, every route bound to `invoker`.
pub fn app(routes: Vec<RouteConfig>, invoker: Arc<FakeInvoker>) -> Router {
    let config = GatewayConfig {
        routes,
        ..GatewayConfig::default()
    };
    let compiled = config
        .routes
        .iter()
        .map(|r| Route::new(r, invoker.clone()))
        .collect();
    let gateway = Gateway::new(RouteTable::new(compiled), config.limits.max_body_bytes);
    GatewayServer::new(gateway, &config).router()
}

/// Read a response body into a string.
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
