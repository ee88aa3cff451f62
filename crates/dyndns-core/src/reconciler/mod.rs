//! Record reconciliation
//!
//! The [`Reconciler`] brings one provider-side address record in line with
//! the resolved public address, using at most one mutating API call.
//!
//! ## State machine (one pass per invocation)
//!
//! ```text
//! Start ──▶ DomainResolved ──▶ RecordResolved ──┬──▶ NoChangeNeeded
//!   │              │                            ├──▶ Updated / WouldUpdate
//!   │              │                            └──▶ UpdateFailed
//!   ▼              ▼
//! DomainNotFound   RecordNotFound
//! AmbiguousDomain  AmbiguousRecord
//! ```
//!
//! No state is revisited and nothing is retried: the next scheduled run is
//! the retry.

use crate::config::{ReconcileTarget, is_numeric_id};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DomainEntry, HostRecord, RecordType};
use std::net::IpAddr;
use tracing::{debug, error, info};

/// Successful result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record already holds the current address
    NoChangeNeeded {
        /// Fully-qualified record name
        record: String,
        /// The address both sides agree on
        current: IpAddr,
    },

    /// The record was changed
    Updated {
        /// Fully-qualified record name
        record: String,
        /// Value before the update, as published
        previous: String,
        /// Value after the update
        current: IpAddr,
    },

    /// Dry-run: the record differs and would have been changed
    WouldUpdate {
        /// Fully-qualified record name
        record: String,
        /// Value currently published
        previous: String,
        /// Value that would be written
        current: IpAddr,
    },
}

impl Outcome {
    /// Whether a mutating call was made
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Updated { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::NoChangeNeeded { record, current } => {
                write!(f, "no change needed: {} already points to {}", record, current)
            }
            Outcome::Updated {
                record,
                previous,
                current,
            } => write!(f, "updated {}: {} -> {}", record, previous, current),
            Outcome::WouldUpdate {
                record,
                previous,
                current,
            } => write!(f, "dry run: would update {}: {} -> {}", record, previous, current),
        }
    }
}

/// Reconciles one host record against a resolved address
pub struct Reconciler {
    /// Provider API
    provider: Box<dyn DnsProvider>,

    /// Record to reconcile
    target: ReconcileTarget,
}

impl Reconciler {
    /// Create a reconciler
    pub fn new(provider: Box<dyn DnsProvider>, target: ReconcileTarget) -> Self {
        Self { provider, target }
    }

    /// The record this reconciler operates on
    pub fn target(&self) -> &ReconcileTarget {
        &self.target
    }

    /// Run one reconciliation pass for `address`
    pub async fn reconcile(&self, address: IpAddr) -> Result<Outcome> {
        let record_type = RecordType::for_address(&address);
        debug!(
            "Reconciling {} record '{}' in '{}' against {} via {}",
            record_type,
            self.target.host,
            self.target.domain,
            address,
            self.provider.provider_name()
        );

        let domain = self.resolve_domain().await?;
        debug!("Domain resolved: {} (id {})", domain.name, domain.id);

        let record = self.resolve_record(&domain, record_type).await?;
        let fqdn = qualified_name(&record.name, &domain.name);
        debug!(
            "Record resolved: {} (id {}) currently {}",
            fqdn, record.id, record.target
        );

        if target_matches(&record.target, &address) {
            info!("{} already points to {}, no update needed", fqdn, address);
            return Ok(Outcome::NoChangeNeeded {
                record: fqdn,
                current: address,
            });
        }

        if self.target.dry_run {
            info!(
                "[DRY-RUN] Would update {}: {} -> {}",
                fqdn, record.target, address
            );
            return Ok(Outcome::WouldUpdate {
                record: fqdn,
                previous: record.target,
                current: address,
            });
        }

        info!("Updating {}: {} -> {}", fqdn, record.target, address);
        if let Err(e) = self
            .provider
            .update_record(&domain.id, &record.id, address)
            .await
        {
            error!("Update of {} failed: {}", fqdn, e);
            return Err(Error::update_failed(fqdn, e));
        }

        info!("Updated {}: {} -> {}", fqdn, record.target, address);
        Ok(Outcome::Updated {
            record: fqdn,
            previous: record.target,
            current: address,
        })
    }

    /// Step 1: exactly one domain must match
    async fn resolve_domain(&self) -> Result<DomainEntry> {
        let wanted = &self.target.domain;
        let by_id = is_numeric_id(wanted);

        let mut matches: Vec<DomainEntry> = self
            .provider
            .find_domains(wanted)
            .await?
            .into_iter()
            .filter(|d| names_equal(&d.name, wanted) || (by_id && d.id == *wanted))
            .collect();

        match matches.len() {
            0 => Err(Error::DomainNotFound(wanted.clone())),
            1 => Ok(matches.remove(0)),
            n => Err(Error::AmbiguousDomain {
                domain: wanted.clone(),
                matches: n,
            }),
        }
    }

    /// Step 2: exactly one address record of the right type must match
    async fn resolve_record(
        &self,
        domain: &DomainEntry,
        record_type: RecordType,
    ) -> Result<HostRecord> {
        let label = self.target.host_label();
        let by_id = is_numeric_id(&self.target.host);

        let mut matches: Vec<HostRecord> = self
            .provider
            .find_address_records(&domain.id, record_type)
            .await?
            .into_iter()
            .filter(|r| r.record_type == record_type)
            .filter(|r| names_equal(&r.name, label) || (by_id && r.id == self.target.host))
            .collect();

        match matches.len() {
            0 => Err(Error::RecordNotFound {
                domain: domain.name.clone(),
                host: self.target.host.clone(),
                record_type: record_type.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            n => Err(Error::AmbiguousRecord {
                domain: domain.name.clone(),
                host: self.target.host.clone(),
                record_type: record_type.to_string(),
                matches: n,
            }),
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("provider", &self.provider.provider_name())
            .field("target", &self.target)
            .finish()
    }
}

/// DNS names compare case-insensitively and ignore one trailing dot
fn names_equal(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('.').unwrap_or(a);
    let b = b.strip_suffix('.').unwrap_or(b);
    a.eq_ignore_ascii_case(b)
}

/// Whether the published value already equals `address`
///
/// Literal comparison first, then parsed comparison so that differently
/// written IPv6 forms of the same address are treated as equal.
fn target_matches(target: &str, address: &IpAddr) -> bool {
    let target = target.trim();
    target.eq_ignore_ascii_case(&address.to_string())
        || target.parse::<IpAddr>().is_ok_and(|published| published == *address)
}

fn qualified_name(label: &str, domain: &str) -> String {
    if label.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", label, domain)
    }
}
