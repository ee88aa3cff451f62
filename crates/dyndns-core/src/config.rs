//! Configuration types for the dyndns system
//!
//! All settings for one invocation are gathered into an immutable
//! [`DyndnsConfig`] that is validated once and then handed to the resolver
//! and reconciler. Nothing is read from ambient global state.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;

/// Default timeout for a single IP-echo request (seconds)
pub const DEFAULT_ECHO_TIMEOUT_SECS: u64 = 10;

/// Default timeout for a single provider API request (seconds)
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Upper bound accepted for any request timeout (seconds)
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Label used on the command line for the zone apex
pub const APEX_LABEL: &str = "@";

/// Main configuration for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DyndnsConfig {
    /// Provider API credential
    pub credential: Credential,

    /// Which record to reconcile
    pub target: ReconcileTarget,

    /// How to discover the public address
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Timeout for each provider API request (in seconds)
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

impl DyndnsConfig {
    /// Create a configuration with default resolver settings
    pub fn new(credential: Credential, target: ReconcileTarget) -> Self {
        Self {
            credential,
            target,
            resolver: ResolverConfig::default(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }

    /// Replace the resolver settings
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.credential.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        self.target.validate()?;
        self.resolver.validate()?;
        validate_timeout("provider timeout", self.provider_timeout_secs)?;

        Ok(())
    }
}

/// Opaque provider API credential
///
/// The value is only reachable through [`Credential::expose`]. `Debug`,
/// `Display` and `Serialize` all print a placeholder.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for building the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty or whitespace
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<REDACTED>)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl Serialize for Credential {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<REDACTED>")
    }
}

/// The record the reconciler operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileTarget {
    /// Domain name (or numeric provider domain ID)
    pub domain: String,

    /// Host label (or numeric provider record ID); `@` for the apex
    pub host: String,

    /// Look everything up but skip the update call
    #[serde(default)]
    pub dry_run: bool,
}

impl ReconcileTarget {
    /// Create a live (non dry-run) target
    pub fn new(domain: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Host label as stored by the provider (`@` maps to the empty label)
    pub fn host_label(&self) -> &str {
        if self.host == APEX_LABEL { "" } else { &self.host }
    }

    /// Validate the target
    pub fn validate(&self) -> Result<(), crate::Error> {
        // Provider domain IDs are accepted as-is
        if !is_numeric_id(&self.domain) {
            validate_domain_name(&self.domain)?;
        }

        let host = self.host.trim();
        if host.is_empty() {
            return Err(crate::Error::config(
                "Host label cannot be empty (use '@' for the zone apex)",
            ));
        }
        if host != self.host || host.chars().any(char::is_whitespace) {
            return Err(crate::Error::config(format!(
                "Host label contains whitespace: '{}'",
                self.host
            )));
        }
        if host.len() > 253 {
            return Err(crate::Error::config(format!(
                "Host label too long: {} chars (max 253)",
                host.len()
            )));
        }

        Ok(())
    }
}

/// IP-echo settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Endpoints to try, in order
    pub endpoints: Vec<EchoEndpoint>,

    /// Which address family is acceptable
    #[serde(default)]
    pub family: AddressFamily,

    /// Timeout for each echo request (in seconds)
    #[serde(default = "default_echo_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            family: AddressFamily::default(),
            timeout_secs: default_echo_timeout_secs(),
        }
    }
}

impl ResolverConfig {
    /// Create a resolver configuration for the given endpoints
    pub fn new(endpoints: Vec<EchoEndpoint>) -> Self {
        Self {
            endpoints,
            ..Self::default()
        }
    }

    /// Set the accepted address family
    pub fn with_family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.endpoints.is_empty() {
            return Err(crate::Error::config(
                "At least one IP-echo endpoint is required",
            ));
        }

        for endpoint in &self.endpoints {
            endpoint.validate()?;
        }

        validate_timeout("echo timeout", self.timeout_secs)
    }
}

/// An IP-echo service and how to read its response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoEndpoint {
    /// URL to GET
    pub url: String,

    /// Response format
    #[serde(default)]
    pub format: ResponseFormat,
}

impl EchoEndpoint {
    /// Create an endpoint with an explicit format
    pub fn new(url: impl Into<String>, format: ResponseFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }

    /// Endpoint whose body is just the address
    pub fn plain(url: impl Into<String>) -> Self {
        Self::new(url, ResponseFormat::Plain)
    }

    /// Endpoint whose body wraps the address in other text or markup
    pub fn embedded(url: impl Into<String>) -> Self {
        Self::new(url, ResponseFormat::Embedded)
    }

    /// Validate the endpoint
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP-echo endpoint URL cannot be empty"));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP-echo endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }

        if let ResponseFormat::Json { field } = &self.format
            && field.is_empty()
        {
            return Err(crate::Error::config(format!(
                "JSON response format for {} needs a field name",
                self.url
            )));
        }

        Ok(())
    }
}

/// How an echo response carries the address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Whole body (trimmed) is the address
    #[default]
    Plain,

    /// First address-shaped token anywhere in the body (HTML, prose)
    Embedded,

    /// Body is a JSON object holding the address in a string field
    Json {
        /// Top-level field name
        field: String,
    },
}

impl FromStr for ResponseFormat {
    type Err = crate::Error;

    /// Parses `plain`, `embedded` or `json:<field>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "plain" => Ok(ResponseFormat::Plain),
            "embedded" => Ok(ResponseFormat::Embedded),
            other => match other.strip_prefix("json:") {
                Some(field) if !field.is_empty() => Ok(ResponseFormat::Json {
                    field: field.to_string(),
                }),
                _ => Err(crate::Error::config(format!(
                    "Unknown response format '{}'. Valid: plain, embedded, json:<field>",
                    s
                ))),
            },
        }
    }
}

/// Address family accepted from echo services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 only
    #[default]
    V4,
    /// IPv6 only
    V6,
    /// Either
    Any,
}

impl AddressFamily {
    /// Whether `ip` belongs to this family
    pub fn accepts(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
            AddressFamily::Any => true,
        }
    }
}

impl FromStr for AddressFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v4" | "ipv4" => Ok(AddressFamily::V4),
            "v6" | "ipv6" => Ok(AddressFamily::V6),
            "any" | "both" => Ok(AddressFamily::Any),
            _ => Err(crate::Error::config(format!(
                "Unknown address family '{}'. Valid: v4, v6, any",
                s
            ))),
        }
    }
}

fn default_echo_timeout_secs() -> u64 {
    DEFAULT_ECHO_TIMEOUT_SECS
}

fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

fn validate_timeout(what: &str, secs: u64) -> Result<(), crate::Error> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(crate::Error::config(format!(
            "{} must be between 1 and {} seconds. Got: {}",
            what, MAX_TIMEOUT_SECS, secs
        )));
    }
    Ok(())
}

pub(crate) fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validate that a string is a plausible domain name
///
/// Basic RFC 1035 shape checks: total length, label length, characters,
/// and hyphen placement. A single trailing dot is allowed.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(crate::Error::config(format!(
            "Domain name must be fully qualified. Got: '{}'",
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                 Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
