// # dyndns-core
//
// Core library for one-shot dynamic DNS reconciliation.
//
// ## Architecture Overview
//
// Each invocation runs two components in sequence:
// - **IpResolver**: asks IP-echo endpoints, in order, for the public address
// - **Reconciler**: compares that address with one provider-side address
//   record and updates it only when they differ
//
// Both reach the network only through capability traits:
// - **EchoClient**: fetch text from a URL
// - **DnsProvider**: find domains, find address records, update a record
//
// **DyndnsEngine** wires them together for a single run.
//
// ## Design Principles
//
// 1. **Explicit configuration**: everything arrives in an immutable `DyndnsConfig`
// 2. **No local state**: nothing is cached or persisted between runs
// 3. **Fail rather than guess**: ambiguous or missing domains/records are fatal
// 4. **Minimal writes**: at most one mutating provider call per run

pub mod traits;
pub mod config;
pub mod error;
pub mod resolver;
pub mod reconciler;
pub mod engine;

// Re-export core types for convenience
pub use traits::{DnsProvider, DomainEntry, EchoClient, HostRecord, RecordType};
pub use config::{
    AddressFamily, Credential, DyndnsConfig, EchoEndpoint, ReconcileTarget, ResolverConfig,
    ResponseFormat,
};
pub use error::{EchoAttempt, Error, ErrorKind, Result};
pub use resolver::IpResolver;
pub use reconciler::{Outcome, Reconciler};
pub use engine::DyndnsEngine;
