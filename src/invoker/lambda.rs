//! AWS Lambda invoker backed by the official `aws-sdk-lambda` crate.
//!
//! # Authentication
//!
//! Static credentials and region from the route config take precedence.
//! Anything left unset is resolved through the standard AWS chain:
//! environment variables → shared credentials file → instance profile.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::config::{Credentials, Region};
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client;
use bytes::Bytes;

use super::{InvokeError, Invoker};
use crate::config::AwsSettings;

const CREDENTIALS_SOURCE: &str = "lambda-gateway-config";

/// Invoker that calls AWS Lambda `Invoke`.
#[derive(Debug, Clone)]
pub struct LambdaInvoker {
    client: Client,
}

impl LambdaInvoker {
    /// Build a client from route-level AWS settings.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let (Some(access), Some(secret)) = (&settings.access_key, &settings.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                CREDENTIALS_SOURCE,
            ));
        }

        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        tracing::debug!(
            region = ?sdk_config.region(),
            static_credentials = settings.access_key.is_some(),
            "Lambda client configured"
        );

        Self::from_client(Client::new(&sdk_config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Invoker for LambdaInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Bytes,
        qualifier: Option<&str>,
    ) -> Result<Bytes, InvokeError> {
        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_owned))
            .payload(Blob::new(payload.to_vec()))
            .send()
            .await
            .map_err(|e| InvokeError::Transport(DisplayErrorContext(&e).to_string()))?;

        let reply = output
            .payload()
            .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
            .unwrap_or_default();

        if let Some(kind) = output.function_error() {
            return Err(InvokeError::Function {
                kind: kind.to_string(),
                payload: reply,
            });
        }

        Ok(reply)
    }
}
