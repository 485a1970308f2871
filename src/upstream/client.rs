//! Outbound HTTP client for registries, the auth origin and redirect targets.
//!
//! # Responsibilities
//! - Send one outbound request per call, no retries
//! - Stream request and response bodies without buffering
//! - Convert upstream responses into axum responses
//!
//! # Design Decisions
//! - Two pooled clients: one that surfaces 3xx responses to the caller and
//!   one that follows them (bounded by `upstream.max_redirects`)
//! - Hop-by-hop response headers are dropped at conversion time

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Response},
};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::{ProxyError, Result};
use crate::security::headers::strip_hop_by_hop;

/// Response received from an upstream, body still streaming.
pub type UpstreamResponse = Response<Body>;

/// How the transport treats 3xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Return 3xx responses as-is.
    Manual,
    /// Follow redirects inside the transport.
    Follow,
}

/// A request about to leave the proxy.
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Inbound body, forwarded as a stream.
    pub body: Option<Body>,
    /// Cache lifetime hint for caching-capable transports.
    pub cache_ttl: Option<Duration>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            cache_ttl: None,
        }
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach the inbound body. GET and HEAD never carry one.
    ///
    /// Call after [`headers`](Self::headers): the declared `Content-Length`
    /// is carried over so uploads keep their framing.
    pub fn inbound_body(mut self, method: &Method, inbound: &HeaderMap, body: Body) -> Self {
        if *method == Method::GET || *method == Method::HEAD {
            return self;
        }

        if let Some(length) = inbound.get(header::CONTENT_LENGTH) {
            self.headers.insert(header::CONTENT_LENGTH, length.clone());
        }
        self.body = Some(body);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}

/// Pooled upstream transport.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    manual: reqwest::Client,
    following: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self> {
        let connect_timeout = Duration::from_secs(timeouts.connect_secs);
        let max_redirects = upstream.max_redirects as usize;

        Ok(Self {
            manual: build_client(Policy::none(), connect_timeout)?,
            following: build_client(Policy::limited(max_redirects), connect_timeout)?,
        })
    }

    /// Send a request and return the response with its body unread.
    pub async fn send(&self, request: OutboundRequest, mode: RedirectMode) -> Result<UpstreamResponse> {
        let client = match mode {
            RedirectMode::Manual => &self.manual,
            RedirectMode::Follow => &self.following,
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            cache_ttl = ?request.cache_ttl,
            redirects = ?mode,
            streaming_body = request.body.is_some(),
            "Sending upstream request"
        );

        let mut builder = client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let response = builder.send().await?;
        Ok(into_upstream_response(response))
    }
}

fn build_client(policy: Policy, connect_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(policy)
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(ProxyError::Client)
}

fn into_upstream_response(response: reqwest::Response) -> UpstreamResponse {
    let status = response.status();
    let mut headers = response.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut upstream = Response::new(Body::from_stream(response.bytes_stream()));
    *upstream.status_mut() = status;
    *upstream.headers_mut() = headers;
    upstream
}

/// Parse an absolute URL, mapping failures to `ProxyError::MalformedUrl`.
pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ProxyError::malformed_url(raw, e))
}

/// `host[:port]` of a URL, as sent in the `Host` header.
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}
