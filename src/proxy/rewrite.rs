//! Docker Registry v2 path normalization and registry request construction.
//!
//! Registries expect an explicit namespace; Docker Hub puts single-segment
//! image names under `library/`. Clients pulling `alpine` through a mirror
//! send `/v2/alpine/manifests/latest`, and token scopes arrive as
//! `repository%3Aalpine%3Apull`. Both are repaired here.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Uri};
use url::Url;

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::http::context::RequestContext;
use crate::security::headers::curated_request_headers;
use crate::upstream::client::parse_url;
use crate::upstream::OutboundRequest;

/// Raw (still percent-encoded) path and query of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub path: String,
    pub query: Option<String>,
}

impl RequestTarget {
    pub fn from_uri(uri: &Uri) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_owned),
        }
    }

    /// Split `path?query` at the first `?`.
    pub fn parse(path_and_query: &str) -> Self {
        match path_and_query.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
            None => Self {
                path: path_and_query.to_string(),
                query: None,
            },
        }
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Absolute URL of this target on `origin` (scheme + authority).
    pub fn on_origin(&self, origin: &str) -> Result<Url> {
        let raw = format!("{}{}", origin.trim_end_matches('/'), self.path_and_query());
        parse_url(&raw)
    }
}

/// Encoded colon that separates repository and action in token scopes.
const ENCODED_COLON: &str = "%3A";
const ENCODED_SLASH: &str = "%2F";
const LIBRARY_PREFIX: &str = "/v2/library";

/// A single normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// `repository%3Aalpine%3Apull&...` → `repository%3Alibrary%2Falpine%3Apull&...`
    EncodedNamespace,
    /// `/v2/alpine/manifests/latest` → `/v2/library/alpine/manifests/latest`
    ImplicitLibrary,
}

impl RewriteRule {
    /// Returns the rewritten target, or `None` if the rule does not apply.
    pub fn apply(&self, target: &RequestTarget) -> Option<RequestTarget> {
        match self {
            RewriteRule::EncodedNamespace => encoded_namespace(target),
            RewriteRule::ImplicitLibrary => implicit_library(target),
        }
    }
}

/// Rules applied to every proxied request, before the token check.
pub const PRE_TOKEN_RULES: &[RewriteRule] = &[RewriteRule::EncodedNamespace];

/// Rules applied to registry requests only.
pub const REGISTRY_RULES: &[RewriteRule] = &[RewriteRule::ImplicitLibrary];

/// Apply `rules` in order.
pub fn apply_rules(rules: &[RewriteRule], target: RequestTarget) -> RequestTarget {
    rules.iter().fold(target, |target, rule| match rule.apply(&target) {
        Some(rewritten) => {
            tracing::debug!(
                rule = ?rule,
                from = %target.path_and_query(),
                to = %rewritten.path_and_query(),
                "Rewrote request target"
            );
            rewritten
        }
        None => target,
    })
}

fn encoded_namespace(target: &RequestTarget) -> Option<RequestTarget> {
    if target.query.as_deref().is_some_and(|q| q.contains(ENCODED_SLASH)) {
        return None;
    }

    let full = target.path_and_query();
    let at = full.find(ENCODED_COLON)? + ENCODED_COLON.len();
    if !full[at..].contains('&') {
        return None;
    }

    let rewritten = format!("{}library{}{}", &full[..at], ENCODED_SLASH, &full[at..]);
    Some(RequestTarget::parse(&rewritten))
}

fn implicit_library(target: &RequestTarget) -> Option<RequestTarget> {
    if target.path.starts_with(LIBRARY_PREFIX) {
        return None;
    }

    let rest = target.path.strip_prefix("/v2/")?;
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    Some(RequestTarget {
        path: format!("/v2/library/{}", rest),
        query: target.query.clone(),
    })
}

/// Build the outbound request to the routed registry.
pub fn registry_request(
    ctx: &RequestContext,
    config: &ProxyConfig,
    method: &Method,
    inbound: &HeaderMap,
    body: Body,
    target: &RequestTarget,
) -> Result<OutboundRequest> {
    let origin = format!("{}://{}", config.upstream.scheme, ctx.route.upstream_host);
    let url = target.on_origin(&origin)?;
    let headers = curated_request_headers(inbound, &ctx.route.upstream_host)?;

    Ok(OutboundRequest::new(method.clone(), url)
        .headers(headers)
        .inbound_body(method, inbound, body)
        .cache_ttl(Duration::from_secs(config.upstream.cache_ttl_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};
    use crate::routing::RouteDecision;

    fn path(p: &str) -> RequestTarget {
        RequestTarget::parse(p)
    }

    fn normalize(target: RequestTarget) -> RequestTarget {
        let target = apply_rules(PRE_TOKEN_RULES, target);
        apply_rules(REGISTRY_RULES, target)
    }

    #[test]
    fn test_implicit_library() {
        let rewritten = apply_rules(REGISTRY_RULES, path("/v2/foo/manifests/latest"));
        assert_eq!(rewritten.path, "/v2/library/foo/manifests/latest");

        let unchanged = apply_rules(REGISTRY_RULES, path("/v2/library/foo/manifests/latest"));
        assert_eq!(unchanged.path, "/v2/library/foo/manifests/latest");

        let unchanged = apply_rules(REGISTRY_RULES, path("/v2/a/b/c/d"));
        assert_eq!(unchanged.path, "/v2/a/b/c/d");

        let unchanged = apply_rules(REGISTRY_RULES, path("/v2/foo/manifests/"));
        assert_eq!(unchanged.path, "/v2/foo/manifests/");
    }

    #[test]
    fn test_implicit_library_keeps_query() {
        let rewritten = apply_rules(REGISTRY_RULES, path("/v2/nginx/tags/list?n=10"));
        assert_eq!(rewritten.path_and_query(), "/v2/library/nginx/tags/list?n=10");
    }

    #[test]
    fn test_encoded_namespace() {
        let rewritten = apply_rules(
            PRE_TOKEN_RULES,
            path("/token?scope=repository%3Abusybox%3Apull&service=registry.docker.io"),
        );
        assert_eq!(
            rewritten.path_and_query(),
            "/token?scope=repository%3Alibrary%2Fbusybox%3Apull&service=registry.docker.io"
        );
    }

    #[test]
    fn test_encoded_namespace_skips_namespaced_scope() {
        let target = path("/token?scope=repository%3Auser%2Fapp%3Apull&service=registry.docker.io");
        assert_eq!(apply_rules(PRE_TOKEN_RULES, target.clone()), target);
    }

    #[test]
    fn test_encoded_namespace_requires_trailing_ampersand() {
        let target = path("/token?service=registry.docker.io&scope=repository%3Abusybox%3Apull");
        assert_eq!(apply_rules(PRE_TOKEN_RULES, target.clone()), target);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "/v2/foo/manifests/latest",
            "/v2/library/foo/manifests/latest",
            "/v2/a/b/c/d",
            "/token?scope=repository%3Abusybox%3Apull&service=registry.docker.io",
            "/v2/",
        ] {
            let once = normalize(path(raw));
            let twice = normalize(once.clone());
            assert_eq!(once, twice, "{}", raw);
        }
    }

    #[test]
    fn test_registry_request() {
        let config = ProxyConfig::default();
        let ctx = RequestContext {
            request_id: "req-1".into(),
            hostname: "hub.mirror.example".into(),
            label: "hub".into(),
            route: RouteDecision {
                upstream_host: "registry-1.docker.io".into(),
                disguised: true,
            },
            public_origin: "https://hub.mirror.example".into(),
        };
        let mut inbound = HeaderMap::new();
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("a=b"));

        let target = path("/v2/library/alpine/manifests/3.19");
        let request = registry_request(&ctx, &config, &Method::GET, &inbound, Body::empty(), &target).unwrap();

        assert_eq!(request.url.as_str(), "https://registry-1.docker.io/v2/library/alpine/manifests/3.19");
        assert_eq!(request.headers[header::HOST], "registry-1.docker.io");
        assert_eq!(request.headers[header::AUTHORIZATION], "Bearer t");
        assert!(!request.headers.contains_key(header::COOKIE));
        assert_eq!(request.cache_ttl, Some(Duration::from_secs(3600)));
    }
}
