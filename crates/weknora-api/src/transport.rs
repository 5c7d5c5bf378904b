//! HTTP transport
//!
//! The only place that talks to the network. Everything above it works
//! with [`ApiRequest`] / [`RawResponse`] so tests can swap in a fake.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::ApiError;
use crate::Result;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please check your connection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path and query, relative to the backend base URL
    pub path: String,
    /// JSON body
    pub body: Option<String>,
    pub bearer: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. `Err` means no response arrived; any HTTP status,
    /// including errors, is an `Ok(RawResponse)`.
    async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
        }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client for `config`. The base URL must be absolute: a native
    /// client has no page origin to resolve relative paths against.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        match url::Url::parse(base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(ApiError::Client(format!(
                    "Unsupported API base URL scheme: {}",
                    parsed.scheme()
                )));
            }
            Err(e) => {
                return Err(ApiError::Client(format!(
                    "API base URL must be absolute, got {:?}: {}",
                    config.base_url, e
                )));
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Client(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(base_url = %base_url, "Created HTTP transport");

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        builder = builder.header("X-Request-ID", &request.request_id);
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(url = %url, "Request failed without response: {}", e);
            ApiError::Network(NETWORK_ERROR_MESSAGE.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Client(format!("Failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}
