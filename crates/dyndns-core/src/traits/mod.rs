//! Core traits for the dyndns system
//!
//! This module defines the capability interfaces the core depends on.
//!
//! - [`EchoClient`]: Fetch text from an IP-echo endpoint
//! - [`DnsProvider`]: Look up and update address records via a provider API

pub mod echo_client;
pub mod dns_provider;

pub use echo_client::EchoClient;
pub use dns_provider::{DnsProvider, DomainEntry, HostRecord, RecordType};
