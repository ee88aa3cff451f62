// # DNS Provider Trait
//
// Defines the interface the reconciler uses to talk to a DNS provider API.
//
// ## Implementations
//
// - Linode: `dyndns-provider-linode` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{DnsProvider, RecordType};
//
// async fn show(provider: &dyn DnsProvider) -> dyndns_core::Result<()> {
//     for domain in provider.find_domains("example.com").await? {
//         let records = provider.find_address_records(&domain.id, RecordType::A).await?;
//         println!("{}: {} A records", domain.name, records.len());
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A domain (zone) as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    /// Provider-assigned identifier
    pub id: String,
    /// Fully-qualified domain name
    pub name: String,
}

impl DomainEntry {
    /// Create a domain entry
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
}

impl RecordType {
    /// The record type that can hold `ip`
    pub fn for_address(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Parse a provider-reported type name; non-address types yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("a") {
            Some(RecordType::A)
        } else if s.eq_ignore_ascii_case("aaaa") {
            Some(RecordType::Aaaa)
        } else {
            None
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a provider-side address record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Provider-assigned identifier
    pub id: String,
    /// Host label within the domain (empty for the zone apex)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Current address value as published
    pub target: String,
}

impl HostRecord {
    /// Create a record snapshot
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type,
            target: target.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// The reconciler drives the whole lookup → compare → update sequence; a
/// provider only translates each logical operation into API calls.
///
/// # Rules for implementations
///
/// - Do not retry or back off. Errors are fatal for the invocation and the
///   next scheduled run retries naturally.
/// - Do not cache between calls.
/// - Do not decide whether an update is needed.
/// - Never log or echo the credential.
///
/// Lookups may return a superset of the exact matches (e.g. when the API
/// filters case-insensitively); the reconciler applies exact matching on
/// top of whatever is returned.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List domains whose name matches `name`
    ///
    /// Read-only. May issue several requests when the API paginates.
    async fn find_domains(&self, name: &str) -> Result<Vec<DomainEntry>, crate::Error>;

    /// List address records of `record_type` within the domain `domain_id`
    ///
    /// Read-only. May issue several requests when the API paginates.
    async fn find_address_records(
        &self,
        domain_id: &str,
        record_type: RecordType,
    ) -> Result<Vec<HostRecord>, crate::Error>;

    /// Set the address value of one record
    ///
    /// This is the only mutating operation and is called at most once per
    /// invocation.
    async fn update_record(
        &self,
        domain_id: &str,
        record_id: &str,
        target: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_follows_address_family() {
        let v4: IpAddr = "203.0.113.7".parse().unwrap();
        let v6: IpAddr = "2001:db8::7".parse().unwrap();

        assert_eq!(RecordType::for_address(&v4), RecordType::A);
        assert_eq!(RecordType::for_address(&v6), RecordType::Aaaa);
    }

    #[test]
    fn record_type_parse_ignores_case_and_rejects_others() {
        assert_eq!(RecordType::parse("a"), Some(RecordType::A));
        assert_eq!(RecordType::parse("AAAA"), Some(RecordType::Aaaa));
        assert_eq!(RecordType::parse("CNAME"), None);
        assert_eq!(RecordType::parse("TXT"), None);
    }

    #[test]
    fn record_type_serializes_uppercase() {
        let json = serde_json::to_string(&RecordType::Aaaa).unwrap();
        assert_eq!(json, "\"AAAA\"");
    }
}
