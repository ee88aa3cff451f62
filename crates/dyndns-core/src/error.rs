//! Error types for the dyndns system
//!
//! Every fatal outcome of an invocation is a variant of [`Error`]. The
//! reconciliation taxonomy (`ResolutionFailure` through `UpdateFailed`) is
//! kept separate from the transport/provider variants so that callers can
//! map them onto distinct exit statuses via [`Error::kind`].

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single failed attempt against an IP-echo endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoAttempt {
    /// Endpoint URL that was contacted
    pub url: String,
    /// Why the attempt did not yield an address
    pub reason: String,
}

impl std::fmt::Display for EchoAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

/// Core error type for the dyndns system
#[derive(Error, Debug)]
pub enum Error {
    /// No IP-echo endpoint produced a valid address
    #[error("could not determine the public IP address ({})", format_attempts(.attempts))]
    ResolutionFailure {
        /// One entry per endpoint tried, in order
        attempts: Vec<EchoAttempt>,
    },

    /// No provider domain matched the requested name
    #[error("domain '{0}' not found or not associated with the supplied credential")]
    DomainNotFound(String),

    /// More than one provider domain matched the requested name
    #[error("domain '{domain}' is ambiguous: {matches} matching domains")]
    AmbiguousDomain {
        /// Requested domain
        domain: String,
        /// Number of matches returned
        matches: usize,
    },

    /// No address record matched the requested host label
    #[error("{record_type} record '{host}' not found in domain '{domain}'")]
    RecordNotFound {
        /// Domain searched
        domain: String,
        /// Requested host label
        host: String,
        /// Record type searched for (A or AAAA)
        record_type: String,
    },

    /// More than one address record matched the requested host label
    #[error("{record_type} record '{host}' in domain '{domain}' is ambiguous: {matches} matching records")]
    AmbiguousRecord {
        /// Domain searched
        domain: String,
        /// Requested host label
        host: String,
        /// Record type searched for (A or AAAA)
        record_type: String,
        /// Number of matches returned
        matches: usize,
    },

    /// The mutating update call was rejected or did not complete
    #[error("failed to update record '{record}': {source}")]
    UpdateFailed {
        /// Record being updated
        record: String,
        /// Underlying provider or transport error
        #[source]
        source: Box<Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider reported a resource as missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`], used to pick an exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration or input
    Config,
    /// Public address could not be determined
    Resolution,
    /// Domain or record could not be resolved unambiguously
    Lookup,
    /// The update call failed
    Update,
    /// Anything else
    Runtime,
}

fn format_attempts(attempts: &[EchoAttempt]) -> String {
    if attempts.is_empty() {
        return "no endpoints configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap an error raised by the mutating update call
    pub fn update_failed(record: impl Into<String>, source: Error) -> Self {
        Self::UpdateFailed {
            record: record.into(),
            source: Box::new(source),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::InvalidInput(_) => ErrorKind::Config,
            Error::ResolutionFailure { .. } => ErrorKind::Resolution,
            Error::DomainNotFound(_)
            | Error::AmbiguousDomain { .. }
            | Error::RecordNotFound { .. }
            | Error::AmbiguousRecord { .. }
            | Error::Authentication(_)
            | Error::RateLimited(_)
            | Error::NotFound(_) => ErrorKind::Lookup,
            Error::UpdateFailed { .. } => ErrorKind::Update,
            Error::Http(_) | Error::Provider { .. } | Error::Json(_) => ErrorKind::Runtime,
        }
    }
}
