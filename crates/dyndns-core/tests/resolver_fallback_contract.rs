//! Contract Test: IP-Echo Fallback
//!
//! Constraints verified:
//! - Endpoints are tried strictly in order
//! - The first valid address wins and later endpoints are never contacted
//! - Unreachable, slow, malformed, or wrong-family endpoints are skipped
//! - When every endpoint fails the resolver reports ResolutionFailure

mod common;

use common::*;
use dyndns_core::{AddressFamily, EchoEndpoint, Error, IpResolver, ResolverConfig};

#[tokio::test]
async fn first_valid_address_short_circuits() {
    let echo = ScriptedEchoClient::new(&[
        ("https://a.example", EchoReply::Body("198.51.100.1\n".to_string())),
        ("https://b.example", EchoReply::Body("198.51.100.2".to_string())),
    ]);

    let resolver = IpResolver::new(
        Box::new(ScriptedEchoClient::sharing_counters_with(&echo)),
        ResolverConfig::new(vec![
            EchoEndpoint::plain("https://a.example"),
            EchoEndpoint::plain("https://b.example"),
        ]),
    )
    .expect("resolver construction succeeds");

    let address = resolver.resolve().await.expect("resolution succeeds");

    assert_eq!(address, ip("198.51.100.1"));
    assert_eq!(
        echo.fetched(),
        vec!["https://a.example"],
        "no endpoint after the first success may be contacted"
    );
}

#[tokio::test]
async fn failing_endpoints_are_skipped_in_order() {
    let echo = ScriptedEchoClient::new(&[
        ("https://refused.example", EchoReply::Fail("connection refused".to_string())),
        ("https://garbage.example", EchoReply::Body("<h1>502 Bad Gateway</h1>".to_string())),
        ("https://good.example", EchoReply::Body("203.0.113.7".to_string())),
        ("https://never.example", EchoReply::Body("203.0.113.99".to_string())),
    ]);

    let resolver = IpResolver::new(
        Box::new(ScriptedEchoClient::sharing_counters_with(&echo)),
        ResolverConfig::new(vec![
            EchoEndpoint::plain("https://missing.example"),
            EchoEndpoint::plain("https://refused.example"),
            EchoEndpoint::plain("https://garbage.example"),
            EchoEndpoint::plain("https://good.example"),
            EchoEndpoint::plain("https://never.example"),
        ]),
    )
    .expect("resolver construction succeeds");

    let address = resolver.resolve().await.expect("resolution succeeds");

    assert_eq!(address, ip("203.0.113.7"));
    assert_eq!(
        echo.fetched(),
        vec![
            "https://missing.example",
            "https://refused.example",
            "https://garbage.example",
            "https://good.example",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn hanging_endpoint_is_bounded_by_timeout() {
    let echo = ScriptedEchoClient::new(&[
        ("https://slow.example", EchoReply::Hang),
        ("https://fast.example", EchoReply::Body("203.0.113.7".to_string())),
    ]);

    let resolver = IpResolver::new(
        Box::new(ScriptedEchoClient::sharing_counters_with(&echo)),
        ResolverConfig::new(vec![
            EchoEndpoint::plain("https://slow.example"),
            EchoEndpoint::plain("https://fast.example"),
        ])
        .with_timeout_secs(2),
    )
    .expect("resolver construction succeeds");

    let started = tokio::time::Instant::now();
    let address = resolver.resolve().await.expect("resolution succeeds");

    assert_eq!(address, ip("203.0.113.7"));
    assert!(started.elapsed() < std::time::Duration::from_secs(60));
    assert_eq!(echo.fetched().len(), 2);
}

#[tokio::test]
async fn wrong_family_counts_as_failure() {
    let echo = ScriptedEchoClient::new(&[
        ("https://v6.example", EchoReply::Body("2001:db8::7".to_string())),
        ("https://v4.example", EchoReply::Body("203.0.113.7".to_string())),
    ]);

    let resolver = IpResolver::new(
        Box::new(ScriptedEchoClient::sharing_counters_with(&echo)),
        ResolverConfig::new(vec![
            EchoEndpoint::plain("https://v6.example"),
            EchoEndpoint::plain("https://v4.example"),
        ])
        .with_family(AddressFamily::V4),
    )
    .expect("resolver construction succeeds");

    assert_eq!(resolver.resolve().await.unwrap(), ip("203.0.113.7"));
    assert_eq!(echo.fetched().len(), 2);
}

#[tokio::test]
async fn ipv6_family_accepts_ipv6_answer() {
    let echo = ScriptedEchoClient::new(&[(
        "https://v6.example",
        EchoReply::Body("2001:db8::7\n".to_string()),
    )]);

    let resolver = IpResolver::new(
        Box::new(echo),
        ResolverConfig::new(vec![EchoEndpoint::plain("https://v6.example")])
            .with_family(AddressFamily::V6),
    )
    .expect("resolver construction succeeds");

    assert_eq!(resolver.resolve().await.unwrap(), ip("2001:db8::7"));
}

#[tokio::test]
async fn all_endpoints_failing_is_resolution_failure() {
    let echo = ScriptedEchoClient::new(&[(
        "https://junk.example",
        EchoReply::Body("999.1.1.1".to_string()),
    )]);

    let resolver = IpResolver::new(
        Box::new(ScriptedEchoClient::sharing_counters_with(&echo)),
        ResolverConfig::new(vec![
            EchoEndpoint::plain("https://down.example"),
            EchoEndpoint::plain("https://junk.example"),
        ]),
    )
    .expect("resolver construction succeeds");

    match resolver.resolve().await {
        Err(Error::ResolutionFailure { attempts }) => {
            let urls: Vec<_> = attempts.iter().map(|a| a.url.as_str()).collect();
            assert_eq!(urls, vec!["https://down.example", "https://junk.example"]);
        }
        other => panic!("expected ResolutionFailure, got {:?}", other),
    }

    assert_eq!(echo.fetched().len(), 2, "each endpoint is tried exactly once");
}
