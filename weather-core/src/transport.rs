//! HTTP plumbing the pipeline depends on.
//!
//! The pipeline only needs "send a request, get a status and a body back", so
//! any client can be plugged in through [`HttpTransport`]. [`ReqwestTransport`]
//! is the one used outside of tests.

use async_trait::async_trait;
use std::fmt::{self, Debug};
use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Failure below HTTP: DNS, TLS, connection resets and the like.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub trait RequestFactory: Send + Sync + Debug {
    fn create(&self, method: HttpMethod, url: &str) -> HttpRequest;
}

/// Builds requests, resolving relative URL fragments against an optional base URL.
#[derive(Debug, Clone, Default)]
pub struct DefaultRequestFactory {
    base_url: Option<String>,
}

impl DefaultRequestFactory {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }

        match self.base_url.as_deref() {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => url.to_string(),
        }
    }
}

impl RequestFactory for DefaultRequestFactory {
    fn create(&self, method: HttpMethod, url: &str) -> HttpRequest {
        HttpRequest { method, url: self.resolve(url) }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
        };

        let res = builder.send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_ignore_base() {
        let factory = DefaultRequestFactory::new(Some("https://api.example.com".into()));
        let req = factory.create(HttpMethod::Get, "https://other.example.com/v1?q=1");

        assert_eq!(req.url, "https://other.example.com/v1?q=1");
        assert_eq!(req.method, HttpMethod::Get);
    }

    #[test]
    fn relative_fragments_join_with_single_slash() {
        let factory = DefaultRequestFactory::new(Some("https://api.example.com/v1/".into()));

        assert_eq!(
            factory.create(HttpMethod::Get, "/current?lat=1&lon=2").url,
            "https://api.example.com/v1/current?lat=1&lon=2"
        );
        assert_eq!(
            factory.create(HttpMethod::Get, "forecast").url,
            "https://api.example.com/v1/forecast"
        );
    }

    #[test]
    fn fragments_pass_through_without_base() {
        let factory = DefaultRequestFactory::default();
        assert_eq!(factory.create(HttpMethod::Get, "current").url, "current");
    }

    #[test]
    fn reqwest_transport_builds_from_default_config() {
        assert!(ReqwestTransport::from_config(&ClientConfig::default()).is_ok());
    }
}
