// # HTTP Echo Client
//
// This crate provides the HTTP(S) transport for the dyndns IP resolver.
//
// ## Purpose
//
// `HttpEchoClient` performs one GET per call with a bounded timeout and
// returns the body as text. It does not parse, retry, or cache: fallback
// across endpoints and address extraction live in `dyndns_core::resolver`.
//
// ## Default services
//
// `default_endpoints()` lists independent public echo services so that a
// single outage does not stop resolution.

use async_trait::async_trait;
use dyndns_core::traits::EchoClient;
use dyndns_core::{EchoEndpoint, Error, ResponseFormat, Result};
use std::time::Duration;

/// Default IP-echo services, tried in this order
pub const DEFAULT_ECHO_SERVICES: &[(&str, ResponseFormat)] = &[
    ("https://api.ipify.org", ResponseFormat::Plain),
    ("https://icanhazip.com", ResponseFormat::Plain), // trailing newline
    ("https://ifconfig.me/ip", ResponseFormat::Plain),
    ("http://checkip.dyndns.org", ResponseFormat::Embedded), // small HTML page
];

/// Built-in endpoint list
pub fn default_endpoints() -> Vec<EchoEndpoint> {
    DEFAULT_ECHO_SERVICES
        .iter()
        .map(|(url, format)| EchoEndpoint::new(*url, format.clone()))
        .collect()
}

/// HTTP(S) transport for IP-echo endpoints
#[derive(Debug, Clone)]
pub struct HttpEchoClient {
    /// HTTP client
    client: reqwest::Client,

    /// Per-request timeout
    timeout: Duration,
}

impl HttpEchoClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linode-dyndns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl EchoClient for HttpEchoClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))
    }
}
