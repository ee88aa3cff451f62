//! Extraction of an IP literal from an echo-service response body

use crate::config::{AddressFamily, ResponseFormat};
use crate::error::{Error, Result};
use std::net::IpAddr;

/// Extract the address carried by `body`
///
/// The address must be syntactically valid and belong to `family`.
pub fn extract_address(body: &str, format: &ResponseFormat, family: AddressFamily) -> Result<IpAddr> {
    match format {
        ResponseFormat::Plain => parse_literal(body.trim(), family),
        ResponseFormat::Embedded => scan_for_address(body, family),
        ResponseFormat::Json { field } => {
            let value: serde_json::Value = serde_json::from_str(body)?;
            let literal = value
                .get(field)
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::invalid_input(format!("no string field '{}' in response", field)))?;
            parse_literal(literal.trim(), family)
        }
    }
}

fn parse_literal(text: &str, family: AddressFamily) -> Result<IpAddr> {
    if text.is_empty() {
        return Err(Error::invalid_input("empty response"));
    }

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::invalid_input(format!("invalid IP address: {}", truncate(text))))?;

    if ip.is_unspecified() {
        return Err(Error::invalid_input(format!("unspecified address {}", ip)));
    }

    if !family.accepts(&ip) {
        return Err(Error::invalid_input(format!(
            "address {} is not of the requested family ({:?})",
            ip, family
        )));
    }

    Ok(ip)
}

/// First address-shaped token of the requested family
///
/// Tokens are maximal runs of ASCII letters, digits, `.` and `:`. Only tokens
/// made entirely of hex digits, `.` and `:` are read as a whole (retried
/// without surrounding punctuation). Dotted text after the last colon is
/// also tried, for `Address:203.0.113.7`.
fn scan_for_address(body: &str, family: AddressFamily) -> Result<IpAddr> {
    let tokens = body
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == ':'))
        .filter(|t| t.contains('.') || t.contains(':'));

    for token in tokens {
        let found = candidates(token)
            .filter_map(|candidate| candidate.parse::<IpAddr>().ok())
            .find(|ip| !ip.is_unspecified() && family.accepts(ip));

        if let Some(ip) = found {
            return Ok(ip);
        }
    }

    Err(Error::invalid_input(format!(
        "no {:?} address in response: {}",
        family,
        truncate(body.trim())
    )))
}

fn candidates(token: &str) -> impl Iterator<Item = &str> {
    let whole = is_address_shaped(token).then_some(token);
    let trimmed = whole.map(|t| t.trim_matches(|c| c == '.' || c == ':'));
    let after_colon = token
        .rsplit_once(':')
        .map(|(_, rest)| rest.trim_end_matches('.'))
        .filter(|rest| rest.contains('.') && is_address_shaped(rest));

    [whole, trimmed, after_colon].into_iter().flatten()
}

fn is_address_shaped(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c == ':')
}

fn truncate(text: &str) -> String {
    const MAX: usize = 64;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
