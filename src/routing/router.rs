//! Hostname label to upstream registry lookup.
//!
//! # Responsibilities
//! - Extract the routing label (first dot-delimited hostname segment)
//! - Look the label up in the route table
//! - Fall back to the default hub host with disguise enabled
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) label lookup via HashMap
//! - Labels are case-sensitive
//! - Never fails: unknown labels resolve to the default host

use std::collections::HashMap;

use crate::config::{RouteConfig, UpstreamConfig};

/// Where a request goes, decided once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// Upstream registry host (may include a port).
    pub upstream_host: String,
    /// Whether browser-style requests on this route get a disguise response.
    pub disguised: bool,
}

/// Compiled route table.
#[derive(Debug, Clone)]
pub struct HostRouter {
    table: HashMap<String, String>,
    default_host: String,
}

impl HostRouter {
    /// Build the router from the configured route table.
    pub fn from_config(routes: &[RouteConfig], upstream: &UpstreamConfig) -> Self {
        let table = routes
            .iter()
            .map(|r| (r.label.clone(), r.upstream.clone()))
            .collect();

        Self {
            table,
            default_host: upstream.default_host.clone(),
        }
    }

    /// Resolve a hostname label.
    pub fn resolve(&self, label: &str) -> RouteDecision {
        match self.table.get(label) {
            Some(host) => RouteDecision {
                upstream_host: host.clone(),
                disguised: false,
            },
            None => RouteDecision {
                upstream_host: self.default_host.clone(),
                disguised: true,
            },
        }
    }
}

/// First dot-delimited segment of a hostname.
pub fn host_label(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or_default()
}
