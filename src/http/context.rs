//! Per-request context threaded through every pipeline stage.

use axum::http::{header, uri::Authority, HeaderMap, Uri};

use crate::config::UpstreamConfig;
use crate::routing::{host_label, HostRouter, RouteDecision};

/// Query parameter that overrides host-based routing.
pub const HUBHOST_PARAM: &str = "hubhost";

/// Label that always enables disguise responses for browser-style paths.
pub const DOCKER_LABEL: &str = "docker";

/// Everything a stage needs to know about the request being served.
///
/// Built once at the top of the handler and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    /// Hostname this proxy was reached at, without port.
    pub hostname: String,
    /// Routing label (first segment of `hubhost` or of `hostname`).
    pub label: String,
    pub route: RouteDecision,
    /// `<public_scheme>://<hostname>`, used to rewrite auth challenges.
    pub public_origin: String,
}

impl RequestContext {
    pub fn new(
        request_id: impl Into<String>,
        uri: &Uri,
        headers: &HeaderMap,
        router: &HostRouter,
        upstream: &UpstreamConfig,
    ) -> Self {
        let hostname = request_hostname(uri, headers);
        let routing_host = hubhost_override(uri).unwrap_or_else(|| hostname.clone());
        let label = host_label(&routing_host).to_string();
        let route = router.resolve(&label);
        let public_origin = format!("{}://{}", upstream.public_scheme, hostname);

        Self {
            request_id: request_id.into(),
            hostname,
            label,
            route,
            public_origin,
        }
    }

    /// Whether a browser-style request gets a disguise response.
    pub fn should_disguise(&self, browser_request: bool) -> bool {
        browser_request && (self.route.disguised || self.label == DOCKER_LABEL)
    }
}

/// Hostname the client addressed, from the URI authority or `Host` header.
fn request_hostname(uri: &Uri, headers: &HeaderMap) -> String {
    if let Some(host) = uri.host() {
        return host.to_string();
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .map(|authority| authority.host().to_string())
        .unwrap_or_default()
}

/// Non-empty `hubhost` query parameter, if present.
fn hubhost_override(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == HUBHOST_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
