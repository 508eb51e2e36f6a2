//! The host side of the core's `HttpRequest`/`HttpResponse` boundary.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method};
use scheduler_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;

/// Executes one HTTP round-trip. Non-2xx statuses are returned as data;
/// only failures to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = ReqwestClient::builder()
            .no_proxy()
            .user_agent(concat!("scheduler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client })
    }
}

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(method(request.method), &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(url = %request.path, error = %err, "HTTP request failed");
            ApiError::Network(err.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
