use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    pub operation_name: String,
    pub variables: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: String,
}

/// Executes one GraphQL operation and yields its `data` object.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, TransportError>;

    async fn set_auth_token(&self, _token: Option<String>) {}
}

pub struct MissingTransport;

#[async_trait]
impl GraphQlTransport for MissingTransport {
    async fn execute(&self, _request: GraphQlRequest) -> Result<Value, TransportError> {
        Err(TransportError::Unavailable)
    }
}

pub struct HttpTransport {
    http: Client,
    endpoint: Url,
    token: RwLock<Option<String>>,
}

impl HttpTransport {
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid GraphQL endpoint '{endpoint}'"))?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            endpoint,
            token: RwLock::new(None),
        })
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, TransportError> {
        debug!(operation = %request.operation_name, "sending graphql request");
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request);
        if let Some(token) = self.token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(operation = %request.operation_name, status = status.as_u16(), "graphql request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse = res.json().await?;
        extract_data(body)
    }

    async fn set_auth_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

fn extract_data(body: GraphQlResponse) -> Result<Value, TransportError> {
    if !body.errors.is_empty() {
        return Err(TransportError::GraphQl(
            body.errors.into_iter().map(|err| err.message).collect(),
        ));
    }
    match body.data {
        Some(data @ Value::Object(_)) => Ok(data),
        _ => Err(TransportError::EmptyResult("data")),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
