//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route table integrity (labels unique, upstreams present)
//! - Validate value ranges (timeouts > 0, redirect bound)
//! - Check that configured origins parse as URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// Upper bound accepted for `upstream.max_redirects`.
pub const MAX_REDIRECT_LIMIT: u32 = 10;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    EmptyRouteLabel { upstream: String },
    DuplicateRouteLabel(String),
    EmptyUpstream { label: String },
    InvalidOrigin { field: &'static str, value: String },
    RedirectLimitOutOfRange(u32),
    ZeroTimeout(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => write!(f, "invalid bind address '{}'", addr),
            ValidationError::EmptyRouteLabel { upstream } => {
                write!(f, "route to '{}' has an empty label", upstream)
            }
            ValidationError::DuplicateRouteLabel(label) => write!(f, "duplicate route label '{}'", label),
            ValidationError::EmptyUpstream { label } => write!(f, "route '{}' has no upstream", label),
            ValidationError::InvalidOrigin { field, value } => {
                write!(f, "{} is not a valid origin: '{}'", field, value)
            }
            ValidationError::RedirectLimitOutOfRange(n) => {
                write!(f, "max_redirects must be within 1..={}, got {}", MAX_REDIRECT_LIMIT, n)
            }
            ValidationError::ZeroTimeout(field) => write!(f, "{} must be greater than zero", field),
        }
    }
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if route.label.is_empty() {
            errors.push(ValidationError::EmptyRouteLabel { upstream: route.upstream.clone() });
        } else if !seen.insert(route.label.as_str()) {
            errors.push(ValidationError::DuplicateRouteLabel(route.label.clone()));
        }
        if route.upstream.trim().is_empty() {
            errors.push(ValidationError::EmptyUpstream { label: route.label.clone() });
        }
    }

    if config.upstream.default_host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream { label: "<default>".to_string() });
    }

    let origins = [
        ("upstream.auth_origin", &config.upstream.auth_origin),
        ("upstream.hub_fallback_origin", &config.upstream.hub_fallback_origin),
    ];
    for (field, value) in origins {
        let parsed = Url::parse(value).ok().filter(|u| u.has_host());
        if parsed.is_none() {
            errors.push(ValidationError::InvalidOrigin { field, value: value.clone() });
        }
    }

    let max = config.upstream.max_redirects;
    if max == 0 || max > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::RedirectLimitOutOfRange(max));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
