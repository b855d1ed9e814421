// src/api_client.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::error::TransportError;

pub const DEFAULT_API_URL: &str = "https://api.platform.opentargets.org/api/v4/graphql";

/// Executes a GraphQL query and returns the full response envelope (`{ "data": ... }`).
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str, variables: &Map<String, Value>) -> Result<Value, TransportError>;
}

/// Fetches a static text resource by URL.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub api_token: Option<String>,
}

/// Builds the API client configuration from environment variables.
/// Covers endpoint URL, request timeout and an optional bearer token.
pub fn build_client_config() -> ClientConfig {
    let api_url = std::env::var("PLATFORM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let timeout_str = std::env::var("PLATFORM_API_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
    let timeout_secs = timeout_str.parse::<u64>().unwrap_or(30);
    let api_token = std::env::var("PLATFORM_API_TOKEN").ok().filter(|t| !t.is_empty());

    info!(
        "API Config: Url={}, Timeout={}s, Token={}",
        api_url,
        timeout_secs,
        if api_token.is_some() { "[hidden]" } else { "none" }
    );
    ClientConfig {
        api_url,
        timeout: Duration::from_secs(timeout_secs),
        api_token,
    }
}

/// HTTP transport for the platform GraphQL API and the static ontology files.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: Client,
    config: ClientConfig,
}

impl GraphQlClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("evidence-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }
}

/// Builds the API client and checks that the endpoint answers a trivial query.
pub async fn connect(config: ClientConfig) -> Result<GraphQlClient> {
    info!("Connecting to platform API at {}...", config.api_url);
    let client = GraphQlClient::new(config)?;

    client
        .execute("query Ping { meta { name } }", &Map::new())
        .await
        .context("Test query 'meta { name }' failed")?;
    info!("Platform API reachable at {}.", client.api_url());
    Ok(client)
}

#[async_trait]
impl QueryExecutor for GraphQlClient {
    async fn execute(&self, query: &str, variables: &Map<String, Value>) -> Result<Value, TransportError> {
        debug!("POST {} with variables {}", self.config.api_url, Value::Object(variables.clone()));
        let mut request = self
            .http
            .post(&self.config.api_url)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.config.api_url.clone(),
            });
        }
        let body: Value = response.json().await?;
        check_graphql_errors(body)
    }
}

#[async_trait]
impl ResourceFetcher for GraphQlClient {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Turns a response carrying a non-empty `errors` array into a transport error.
pub fn check_graphql_errors(body: Value) -> Result<Value, TransportError> {
    match body.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => {
            let messages = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect();
            Err(TransportError::GraphQl(messages))
        }
        _ => Ok(body),
    }
}
