// # Linode DNS Provider
//
// This crate provides a Linode DNS provider implementation for the dyndns
// reconciler.
//
// ## Behavior
//
// - One logical operation per trait call; list calls follow pagination
// - No retry, backoff, or caching (a failed run is retried by the next one)
// - Specific error mapping for HTTP status codes (401/403, 404, 429, 5xx)
// - Linode's `errors[].reason` messages are surfaced verbatim
// - HTTP timeout configured per client
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Linode API v4: https://techdocs.akamai.com/linode-api/reference/api
// - List Domains: GET `/domains` (filterable with `X-Filter: {"domain": ...}`)
// - List Domain Records: GET `/domains/:domain_id/records`
// - Update Domain Record: PUT `/domains/:domain_id/records/:record_id`

use async_trait::async_trait;
use dyndns_core::traits::{DnsProvider, DomainEntry, HostRecord, RecordType};
use dyndns_core::{Credential, Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::Duration;

/// Linode API base URL
pub const LINODE_API_BASE: &str = "https://api.linode.com/v4";

/// Page size requested from list endpoints (Linode maximum)
const PAGE_SIZE: u32 = 500;

/// Upper bound on pages followed for a single listing
const MAX_PAGES: u32 = 100;

/// One page of a Linode list response
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default = "first_page")]
    pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Domain object as returned by `GET /domains`
#[derive(Debug, Deserialize)]
struct LinodeDomain {
    id: u64,
    domain: String,
}

impl From<LinodeDomain> for DomainEntry {
    fn from(d: LinodeDomain) -> Self {
        DomainEntry::new(d.id.to_string(), d.domain)
    }
}

/// Record object as returned by `GET /domains/:id/records`
#[derive(Debug, Deserialize)]
struct LinodeRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    target: String,
}

impl LinodeRecord {
    /// Convert address records; other types yield `None`
    fn into_host_record(self) -> Option<HostRecord> {
        let record_type = RecordType::parse(&self.record_type)?;
        Some(HostRecord::new(
            self.id.to_string(),
            self.name,
            record_type,
            self.target,
        ))
    }
}

/// Error body: `{"errors": [{"reason": "...", "field": "..."}]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    reason: String,
    field: Option<String>,
}

/// Linode DNS provider
///
/// Stateless: every call maps onto one (or, for paginated listings,
/// several) API requests.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct LinodeProvider {
    /// Linode personal access token (Domains read/write scope)
    /// ⚠️ NEVER log this value
    token: Credential,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for LinodeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinodeProvider")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LinodeProvider {
    /// Create a new Linode provider
    ///
    /// # Parameters
    ///
    /// - `token`: Linode API token with Domains read/write access
    /// - `timeout`: timeout for each API request
    pub fn new(token: Credential, timeout: Duration) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::config("Linode API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linode-dyndns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            base_url: LINODE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch every page of a list endpoint
    ///
    /// # API Call
    ///
    /// ```http
    /// GET {path}?page=N&page_size=500
    /// Authorization: Bearer <token>
    /// X-Filter: {...}            (optional)
    /// ```
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filter: Option<&serde_json::Value>,
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!("GET {} (page {})", path, page);

            let mut request = self
                .client
                .get(&url)
                .bearer_auth(self.token.expose())
                .query(&[("page", page), ("page_size", PAGE_SIZE)]);
            if let Some(filter) = filter {
                request = request.header("X-Filter", filter.to_string());
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(error_from_response(response, path).await);
            }

            let body: Page<T> = response
                .json()
                .await
                .map_err(|e| Error::provider("linode", format!("Failed to parse response: {}", e)))?;

            items.extend(body.data);

            if !has_next_page(page, body.pages)? {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Whether another page follows `page`
///
/// Stopping early would hide records, so hitting the cap is an error.
fn has_next_page(page: u32, pages: u32) -> Result<bool> {
    if page >= pages {
        return Ok(false);
    }
    if page >= MAX_PAGES {
        return Err(Error::provider(
            "linode",
            format!("Listing has {} pages, more than the {} followed", pages, MAX_PAGES),
        ));
    }
    Ok(true)
}

/// Turn a non-success response into an error
async fn error_from_response(response: reqwest::Response, what: &str) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    map_status(status.as_u16(), &body, what)
}

/// Map an HTTP status and Linode error body onto an [`Error`]
fn map_status(status: u16, body: &str, what: &str) -> Error {
    let reasons = describe_errors(body);

    match status {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions ({}): {}",
            status, reasons
        )),
        404 => Error::not_found(format!("{}: {}", what, reasons)),
        429 => Error::rate_limited(format!("Linode API rate limit exceeded: {}", reasons)),
        500..=599 => Error::provider(
            "linode",
            format!("Linode server error (transient): {} - {}", status, reasons),
        ),
        _ => Error::provider("linode", format!("{} failed: {} - {}", what, status, reasons)),
    }
}

/// Join Linode's `errors[]` entries; fall back to the raw body
fn describe_errors(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .iter()
            .map(|e| match &e.field {
                Some(field) => format!("{} (field: {})", e.reason, field),
                None => e.reason.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

/// Reject IDs that would alter the request path
fn path_id(id: &str) -> Result<&str> {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(Error::invalid_input(format!("Invalid Linode ID: '{}'", id)))
    }
}

#[async_trait]
impl DnsProvider for LinodeProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /domains
    /// X-Filter: {"domain": "example.com"}
    /// ```
    ///
    /// A numeric `name` is treated as a possible domain ID, so the listing
    /// is not filtered by name.
    async fn find_domains(&self, name: &str) -> Result<Vec<DomainEntry>> {
        let by_id = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
        // Linode stores zone names lowercase without the root dot
        let zone = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();
        let filter = serde_json::json!({ "domain": zone });

        let domains: Vec<LinodeDomain> = self
            .list_all("/domains", (!by_id).then_some(&filter))
            .await?;

        tracing::debug!("Linode returned {} domain(s) for '{}'", domains.len(), name);
        Ok(domains.into_iter().map(DomainEntry::from).collect())
    }

    /// # API Call
    ///
    /// ```http
    /// GET /domains/:domain_id/records
    /// ```
    async fn find_address_records(
        &self,
        domain_id: &str,
        record_type: RecordType,
    ) -> Result<Vec<HostRecord>> {
        let path = format!("/domains/{}/records", path_id(domain_id)?);
        let records: Vec<LinodeRecord> = self.list_all(&path, None).await?;

        let records: Vec<HostRecord> = records
            .into_iter()
            .filter_map(LinodeRecord::into_host_record)
            .filter(|r| r.record_type == record_type)
            .collect();

        tracing::debug!(
            "Linode returned {} {} record(s) in domain {}",
            records.len(),
            record_type,
            domain_id
        );
        Ok(records)
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /domains/:domain_id/records/:record_id
    /// {"target": "203.0.113.7"}
    /// ```
    async fn update_record(&self, domain_id: &str, record_id: &str, target: IpAddr) -> Result<()> {
        let path = format!(
            "/domains/{}/records/{}",
            path_id(domain_id)?,
            path_id(record_id)?
        );
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("PUT {} -> {}", path, target);

        let response = self
            .client
            .put(&url)
            .bearer_auth(self.token.expose())
            .json(&serde_json::json!({ "target": target.to_string() }))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, &path).await);
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "linode"
    }
}
