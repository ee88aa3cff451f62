// # Echo Client Trait
//
// Defines the single network capability the IP resolver needs: fetching the
// body of an IP-echo endpoint as text.
//
// ## Implementations
//
// - HTTP(S): `dyndns-ip-http` crate
// - Tests: scripted fakes in `dyndns-core/tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::EchoClient;
//
// async fn show(client: &dyn EchoClient) -> dyndns_core::Result<()> {
//     let body = client.fetch_text("https://api.ipify.org").await?;
//     println!("echo said: {}", body.trim());
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for fetching text from IP-echo endpoints
///
/// Implementations perform exactly one request per call and bound it with
/// a timeout. They must not retry, cache, or interpret the body: parsing
/// and fallback across endpoints belong to [`crate::resolver::IpResolver`].
///
/// # Errors
///
/// Any failure (unreachable host, timeout, non-success status, unreadable
/// body) is returned as an `Err`. The resolver treats every error the same
/// way: the endpoint is skipped.
#[async_trait]
pub trait EchoClient: Send + Sync {
    /// Fetch the response body of `url`
    async fn fetch_text(&self, url: &str) -> Result<String, crate::Error>;
}

