//! HTTP transport seam
//!
//! The catalog fetcher and image resolver only talk to the network through
//! [`Transport`], so the service can be handed any implementation. The
//! production one is [`ReqwestTransport`].

use std::future::Future;

use futures_util::StreamExt;
use reqwest::Client;

use crate::config::ServiceConfig;
use crate::error::{FetchError, Result};
use crate::log_debug;
use crate::utils::create_client;

const MODULE: &str = "transport";

/// Status and body of a completed GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Empty for non-2xx responses
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Take the body, or fail with [`FetchError::BadStatus`]
    pub fn into_body(self) -> Result<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::BadStatus(self.status))
        }
    }
}

/// Performs HTTP GET requests on behalf of the catalog service
///
/// Implementations report transport failures as errors and any HTTP status
/// (including 4xx/5xx) as an [`HttpResponse`]. Bodies longer than
/// `max_bytes` fail with [`FetchError::TooLarge`].
pub trait Transport: Send + Sync + 'static {
    fn get(
        &self,
        url: &str,
        max_bytes: usize,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, max_bytes: usize) -> Result<HttpResponse> {
        log_debug!(MODULE, "GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            log_debug!(MODULE, "GET {} returned HTTP {}", url, status);
            return Ok(HttpResponse::status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > max_bytes as u64 {
                return Err(FetchError::TooLarge { limit: max_bytes });
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > max_bytes {
                return Err(FetchError::TooLarge { limit: max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        log_debug!(MODULE, "GET {} read {} bytes", url, body.len());
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
