//! Public IP resolution
//!
//! The [`IpResolver`] asks a list of IP-echo endpoints, in order, for the
//! caller's public address and returns the first valid answer:
//!
//! ```text
//! endpoint 1 ──✗──▶ endpoint 2 ──✗──▶ endpoint 3 ──✓──▶ IpAddr
//!                                                  (endpoint 4 never contacted)
//! ```
//!
//! An endpoint fails when it is unreachable, exceeds the timeout, or returns
//! a body that [`extract_address`] cannot turn into an address of the
//! configured family. When every endpoint fails the resolver returns
//! [`Error::ResolutionFailure`] listing each attempt.

mod parse;

pub use parse::extract_address;

use crate::config::{AddressFamily, EchoEndpoint, ResolverConfig};
use crate::error::{EchoAttempt, Error, Result};
use crate::traits::EchoClient;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sequential, first-success IP resolver
pub struct IpResolver {
    /// Transport used to reach the endpoints
    client: Box<dyn EchoClient>,

    /// Endpoints, in the order they are tried
    endpoints: Vec<EchoEndpoint>,

    /// Accepted address family
    family: AddressFamily,

    /// Upper bound for each attempt
    timeout: Duration,
}

impl IpResolver {
    /// Create a resolver
    ///
    /// Fails if the configuration has no endpoints or an invalid one.
    pub fn new(client: Box<dyn EchoClient>, config: ResolverConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            client,
            endpoints: config.endpoints,
            family: config.family,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Endpoints in the order they are tried
    pub fn endpoints(&self) -> &[EchoEndpoint] {
        &self.endpoints
    }

    /// Accepted address family
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Determine the current public address
    pub async fn resolve(&self) -> Result<IpAddr> {
        let mut attempts = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            debug!("Querying IP-echo endpoint {}", endpoint.url);

            match self.try_endpoint(endpoint).await {
                Ok(ip) => {
                    info!("Public IP address {} (from {})", ip, endpoint.url);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("IP-echo endpoint {} failed: {}", endpoint.url, e);
                    attempts.push(EchoAttempt {
                        url: endpoint.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(Error::ResolutionFailure { attempts })
    }

    async fn try_endpoint(&self, endpoint: &EchoEndpoint) -> Result<IpAddr> {
        let body = tokio::time::timeout(self.timeout, self.client.fetch_text(&endpoint.url))
            .await
            .map_err(|_| Error::http(format!("timed out after {:?}", self.timeout)))??;

        extract_address(&body, &endpoint.format, self.family)
    }
}

impl std::fmt::Debug for IpResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpResolver")
            .field("endpoints", &self.endpoints)
            .field("family", &self.family)
            .field("timeout", &self.timeout)
            .finish()
    }
}
