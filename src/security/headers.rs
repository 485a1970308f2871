//! Header allow-lists and client-facing header policy.
//!
//! # Responsibilities
//! - Curate the request headers forwarded to registries and the auth origin
//! - Strip hop-by-hop and framing headers when relaying verbatim
//! - Remove page security headers and force open CORS on responses
//!
//! # Design Decisions
//! - Registry traffic is never a blind copy of inbound headers
//! - Absent inbound headers are omitted rather than forwarded empty
//! - Header names compare case-insensitively (HeaderMap semantics)

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Inbound headers copied onto registry and token requests.
pub const FORWARDED_REQUEST_HEADERS: &[&str] = &[
    "user-agent",
    "accept",
    "accept-language",
    "accept-encoding",
    "authorization",
];

/// Connection-scoped headers never relayed across the proxy.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Response headers removed before reaching the client.
pub const STRIPPED_RESPONSE_HEADERS: &[&str] = &[
    "content-security-policy",
    "content-security-policy-report-only",
    "clear-site-data",
];

/// Methods advertised on CORS preflight responses.
pub const PREFLIGHT_ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,TRACE,DELETE,HEAD,OPTIONS";

/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "1728000";

/// Client cache lifetime set on proxied responses.
pub const CLIENT_CACHE_CONTROL: &str = "max-age=1500";

/// Build the curated header set for an outbound registry or token request.
///
/// `host` becomes the forced `Host` header.
pub fn curated_request_headers(inbound: &HeaderMap, host: &str) -> Result<HeaderMap, header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(header::HOST, HeaderValue::from_str(host)?);

    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = inbound.get(*name) {
            headers.insert(HeaderName::from_static(*name), value.clone());
        }
    }

    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    Ok(headers)
}

/// Copy inbound headers for verbatim forwarding, minus `Host`, hop-by-hop
/// and body framing headers.
pub fn passthrough_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    strip_hop_by_hop(&mut headers);
    headers
}

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Open CORS, set the client cache lifetime and drop page security headers.
pub fn apply_client_policy(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CLIENT_CACHE_CONTROL));

    for name in STRIPPED_RESPONSE_HEADERS {
        headers.remove(*name);
    }
}

/// Headers answering a CORS preflight.
pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("mirror.example"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("docker/24.0"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=1"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
        headers
    }

    #[test]
    fn test_curated_headers_are_an_allow_list() {
        let headers = curated_request_headers(&inbound(), "registry-1.docker.io").unwrap();

        assert_eq!(headers[header::HOST], "registry-1.docker.io");
        assert_eq!(headers[header::USER_AGENT], "docker/24.0");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[header::CACHE_CONTROL], "max-age=0");
        assert!(!headers.contains_key(header::COOKIE));
        assert!(!headers.contains_key("x-forwarded-for"));
        assert!(!headers.contains_key(header::AUTHORIZATION));
        assert!(!headers.contains_key(header::ACCEPT_LANGUAGE));
    }

    #[test]
    fn test_curated_headers_copy_authorization() {
        let mut inbound = inbound();
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let headers = curated_request_headers(&inbound, "ghcr.io").unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_passthrough_drops_host_and_hop_by_hop() {
        let headers = passthrough_request_headers(&inbound());
        assert!(!headers.contains_key(header::HOST));
        assert!(!headers.contains_key(header::CONNECTION));
        assert_eq!(headers[header::COOKIE], "session=1");
    }

    #[test]
    fn test_client_policy() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'none'"));
        headers.insert(header::CONTENT_SECURITY_POLICY_REPORT_ONLY, HeaderValue::from_static("default-src 'none'"));
        headers.insert("clear-site-data", HeaderValue::from_static("\"cache\""));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(header::ETAG, HeaderValue::from_static("\"abc\""));

        apply_client_policy(&mut headers);

        assert!(!headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(!headers.contains_key(header::CONTENT_SECURITY_POLICY_REPORT_ONLY));
        assert!(!headers.contains_key("clear-site-data"));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], "*");
        assert_eq!(headers[header::CACHE_CONTROL], "max-age=1500");
        assert_eq!(headers[header::ETAG], "\"abc\"");
    }
}
