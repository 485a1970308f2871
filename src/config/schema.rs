//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mirror.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the registry mirror.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream origins and redirect policy.
    pub upstream: UpstreamConfig,

    /// Hostname label to upstream registry table.
    pub routes: Vec<RouteConfig>,

    /// Substitute responses for browser-style requests.
    pub disguise: DisguiseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            routes: default_routes(),
            disguise: DisguiseConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream registry settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme used to reach registry upstreams.
    pub scheme: String,

    /// Registry host for labels missing from the route table.
    pub default_host: String,

    /// Token authentication origin (scheme + host).
    pub auth_origin: String,

    /// Origin used when a disguised request falls through to the hub.
    pub hub_fallback_origin: String,

    /// Scheme of this proxy's own public origin, as seen by clients.
    pub public_scheme: String,

    /// Maximum number of internal redirect re-proxy hops.
    pub max_redirects: u32,

    /// Cache hint attached to outbound registry requests, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            default_host: "registry-1.docker.io".to_string(),
            auth_origin: "https://auth.docker.io".to_string(),
            hub_fallback_origin: "https://registry.hub.docker.com".to_string(),
            public_scheme: "https".to_string(),
            max_redirects: 5,
            cache_ttl_secs: 3600,
        }
    }
}

/// Maps the first label of the request hostname to an upstream registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// First dot-delimited hostname segment (case-sensitive).
    pub label: String,

    /// Upstream registry host (may include a port).
    pub upstream: String,
}

impl RouteConfig {
    pub fn new(label: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            upstream: upstream.into(),
        }
    }
}

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("quay", "quay.io"),
        RouteConfig::new("gcr", "gcr.io"),
        RouteConfig::new("k8s-gcr", "k8s.gcr.io"),
        RouteConfig::new("k8s", "registry.k8s.io"),
        RouteConfig::new("ghcr", "ghcr.io"),
        RouteConfig::new("cloudsmith", "docker.cloudsmith.io"),
        RouteConfig::new("test", "registry-1.docker.io"),
    ]
}

/// Disguise settings. Empty strings count as unset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DisguiseConfig {
    /// Redirect target for disguised requests (`URL302`).
    pub url302: String,

    /// `nginx`, `help`, or a URL to forward disguised requests to (`URL`).
    pub url: String,

    /// Mirror hostnames listed on the help page (`D1`..`D5`).
    pub mirrors: Vec<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed until response headers are produced, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
