//! HTTP seam used by every adapter.
//!
//! Adapters only see [`HttpClient`]; the default implementation is
//! [`ReqwestHttpClient`], tests pass their own.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::errors::BenchError;

/// A fully received HTTP response.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Fails with `HttpError` unless the status is 2xx.
    pub fn ensure_success(self, url: &str) -> Result<Self, BenchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(BenchError::HttpError {
                status: self.status,
                url: url.to_string(),
            })
        }
    }

    pub fn json(&self) -> Result<serde_json::Value, BenchError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Minimal async HTTP client. Implementations must return only after the
/// whole body has been received.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, BenchError>;

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        headers: &[(&str, &str)],
        body: Bytes,
    ) -> Result<HttpResponse, BenchError>;
}

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Builds a client; `timeout` of `None` means requests may wait forever.
    pub fn new(timeout: Option<Duration>) -> Result<Self, BenchError> {
        let mut builder = reqwest::Client::builder().user_agent("apibench/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BenchError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn finish(url: &str, resp: reqwest::Response) -> Result<HttpResponse, BenchError> {
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| BenchError::transport(format!("reading body from {url} failed: {e}")))?;
        debug!(
            event = "http.response_received",
            domain = "http",
            status,
            response_bytes = body.len() as u64
        );
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, BenchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BenchError::transport(format!("GET {url} failed: {e}")))?;
        Self::finish(url, resp).await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        headers: &[(&str, &str)],
        body: Bytes,
    ) -> Result<HttpResponse, BenchError> {
        let mut req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| BenchError::transport(format!("POST {url} failed: {e}")))?;
        Self::finish(url, resp).await
    }
}
