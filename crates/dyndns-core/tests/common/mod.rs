//! Test doubles and common utilities for contract tests
//!
//! The fakes here record every call so tests can assert not only on the
//! outcome of a run but on which network operations it performed.

#![allow(dead_code)]

use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DomainEntry, EchoClient, HostRecord, RecordType};
use dyndns_core::{Credential, DyndnsConfig, EchoEndpoint, ReconcileTarget, ResolverConfig};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted echo endpoint does when contacted
#[derive(Debug, Clone)]
pub enum EchoReply {
    /// Return this body
    Body(String),
    /// Fail with a transport error
    Fail(String),
    /// Never answer (until well past any timeout)
    Hang,
}

/// An EchoClient answering from a fixed script, recording every URL fetched
///
/// URLs missing from the script behave like unreachable hosts.
pub struct ScriptedEchoClient {
    replies: Arc<HashMap<String, EchoReply>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEchoClient {
    pub fn new(replies: &[(&str, EchoReply)]) -> Self {
        Self {
            replies: Arc::new(
                replies
                    .iter()
                    .map(|(url, reply)| (url.to_string(), reply.clone()))
                    .collect(),
            ),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a client that shares script and call log with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            replies: Arc::clone(&other.replies),
            fetched: Arc::clone(&other.fetched),
        }
    }

    /// URLs fetched so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EchoClient for ScriptedEchoClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());

        match self.replies.get(url) {
            Some(EchoReply::Body(body)) => Ok(body.clone()),
            Some(EchoReply::Fail(reason)) => Err(Error::http(reason.clone())),
            Some(EchoReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::http("hung endpoint eventually gave up"))
            }
            None => Err(Error::http(format!("could not connect to {}", url))),
        }
    }
}

/// How the fake provider answers the update call
#[derive(Debug, Clone)]
pub enum UpdateBehavior {
    Accept,
    RejectWith(String),
}

/// Mutable provider-side state, shared between handles
struct ProviderState {
    domains: Vec<DomainEntry>,
    records: HashMap<String, Vec<HostRecord>>,
    update_behavior: UpdateBehavior,
    lookup_error: Option<String>,
}

/// A DnsProvider backed by in-memory domains and records
pub struct FakeDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    domain_lookups: Arc<AtomicUsize>,
    record_lookups: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<(String, String, IpAddr)>>>,
}

impl FakeDnsProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                domains: Vec::new(),
                records: HashMap::new(),
                update_behavior: UpdateBehavior::Accept,
                lookup_error: None,
            })),
            domain_lookups: Arc::new(AtomicUsize::new(0)),
            record_lookups: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a domain
    pub fn with_domain(self, id: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .domains
            .push(DomainEntry::new(id, name));
        self
    }

    /// Add a record to a domain
    pub fn with_record(
        self,
        domain_id: &str,
        record_id: &str,
        name: &str,
        record_type: RecordType,
        target: &str,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(domain_id.to_string())
            .or_default()
            .push(HostRecord::new(record_id, name, record_type, target));
        self
    }

    /// Make the update call fail
    pub fn rejecting_updates(self, reason: &str) -> Self {
        self.state.lock().unwrap().update_behavior = UpdateBehavior::RejectWith(reason.to_string());
        self
    }

    /// Make every lookup fail with an authentication error
    pub fn failing_lookups(self, reason: &str) -> Self {
        self.state.lock().unwrap().lookup_error = Some(reason.to_string());
        self
    }

    /// Create a provider that shares state and counters with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            state: Arc::clone(&other.state),
            domain_lookups: Arc::clone(&other.domain_lookups),
            record_lookups: Arc::clone(&other.record_lookups),
            updates: Arc::clone(&other.updates),
        }
    }

    pub fn domain_lookup_count(&self) -> usize {
        self.domain_lookups.load(Ordering::SeqCst)
    }

    pub fn record_lookup_count(&self) -> usize {
        self.record_lookups.load(Ordering::SeqCst)
    }

    /// Update calls made so far: (domain_id, record_id, target)
    pub fn updates(&self) -> Vec<(String, String, IpAddr)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn provider_call_count(&self) -> usize {
        self.domain_lookup_count() + self.record_lookup_count() + self.updates().len()
    }

    /// Current published value of a record
    pub fn target_of(&self, domain_id: &str, record_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(domain_id)?
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.target.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for FakeDnsProvider {
    async fn find_domains(&self, _name: &str) -> Result<Vec<DomainEntry>> {
        self.domain_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(reason) = &state.lookup_error {
            return Err(Error::auth(reason.clone()));
        }
        // Return everything; the reconciler is responsible for exact matching
        Ok(state.domains.clone())
    }

    async fn find_address_records(
        &self,
        domain_id: &str,
        _record_type: RecordType,
    ) -> Result<Vec<HostRecord>> {
        self.record_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(reason) = &state.lookup_error {
            return Err(Error::auth(reason.clone()));
        }
        // Return every type; the reconciler filters by type too
        Ok(state.records.get(domain_id).cloned().unwrap_or_default())
    }

    async fn update_record(&self, domain_id: &str, record_id: &str, target: IpAddr) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((domain_id.to_string(), record_id.to_string(), target));

        let mut state = self.state.lock().unwrap();
        if let UpdateBehavior::RejectWith(reason) = &state.update_behavior {
            return Err(Error::provider("fake", reason.clone()));
        }

        let record = state
            .records
            .get_mut(domain_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;
        record.target = target.to_string();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Parse an address literal
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid test address")
}

/// Minimal configuration for `host` in `example.com` using plain endpoints
pub fn minimal_config(host: &str, endpoints: &[&str]) -> DyndnsConfig {
    DyndnsConfig::new(
        Credential::new("test-token"),
        ReconcileTarget::new("example.com", host),
    )
    .with_resolver(ResolverConfig::new(
        endpoints.iter().map(|url| EchoEndpoint::plain(*url)).collect(),
    ))
}
