//! One-shot dyndns engine
//!
//! The DyndnsEngine runs a single invocation:
//! - Resolve the public IP via the [`IpResolver`] (or take a manual override)
//! - Reconcile the target record via the [`Reconciler`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   IpAddr    ┌──────────────┐   lookups / update   ┌─────────────┐
//! │ IpResolver  │────────────▶│  Reconciler  │─────────────────────▶│ DnsProvider │
//! └─────────────┘             └──────────────┘                      └─────────────┘
//!        │                            │
//!        ▼                            ▼
//! ┌─────────────┐              Outcome / Error
//! │ EchoClient  │
//! └─────────────┘
//! ```
//!
//! A resolution failure ends the run before the provider is contacted.

use crate::config::DyndnsConfig;
use crate::error::{Error, Result};
use crate::reconciler::{Outcome, Reconciler};
use crate::resolver::IpResolver;
use crate::traits::{DnsProvider, EchoClient};
use std::net::IpAddr;
use tracing::{info, warn};

/// Composes resolver and reconciler for one invocation
#[derive(Debug)]
pub struct DyndnsEngine {
    /// Public IP resolver
    resolver: IpResolver,

    /// Record reconciler
    reconciler: Reconciler,
}

impl DyndnsEngine {
    /// Create an engine from a validated configuration
    ///
    /// # Parameters
    ///
    /// - `echo_client`: transport for the IP-echo endpoints
    /// - `provider`: DNS provider implementation
    /// - `config`: invocation configuration
    pub fn new(
        echo_client: Box<dyn EchoClient>,
        provider: Box<dyn DnsProvider>,
        config: DyndnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        let resolver = IpResolver::new(echo_client, config.resolver)?;
        let reconciler = Reconciler::new(provider, config.target);

        Ok(Self::from_parts(resolver, reconciler))
    }

    /// Create an engine from already-built components
    pub fn from_parts(resolver: IpResolver, reconciler: Reconciler) -> Self {
        Self {
            resolver,
            reconciler,
        }
    }

    /// Run one invocation
    ///
    /// With `override_ip` set, the echo endpoints are not contacted and
    /// that address is reconciled instead. It must still belong to the
    /// configured address family.
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: the record is current (or would be, in dry-run)
    /// - `Err(Error)`: a fatal failure; see [`crate::Error::kind`]
    pub async fn run_once(&self, override_ip: Option<IpAddr>) -> Result<Outcome> {
        let target = self.reconciler.target();
        info!(
            "Checking host '{}' in domain '{}'{}",
            target.host,
            target.domain,
            if target.dry_run { " [mode: DRY-RUN]" } else { "" }
        );

        let address = match override_ip {
            Some(ip) => {
                let family = self.resolver.family();
                if !family.accepts(&ip) {
                    return Err(Error::config(format!(
                        "manual address {} is not of the configured family ({:?})",
                        ip, family
                    )));
                }
                warn!("Using manually supplied address {}, skipping IP-echo endpoints", ip);
                ip
            }
            None => self.resolver.resolve().await?,
        };

        self.reconciler.reconcile(address).await
    }
}
