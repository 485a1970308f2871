//! Token endpoint forwarding.
//!
//! Clients follow the rewritten `Www-Authenticate` realm back to this proxy,
//! so `/token` requests land here and are relayed to the auth origin.

use axum::body::Body;
use axum::http::{HeaderMap, Method};

use crate::error::Result;
use crate::http::context::RequestContext;
use crate::observability::metrics;
use crate::proxy::rewrite::RequestTarget;
use crate::security::headers::curated_request_headers;
use crate::upstream::client::authority;
use crate::upstream::{OutboundRequest, RedirectMode, UpstreamClient, UpstreamResponse};

const TOKEN_SEGMENT: &str = "/token";

/// Whether the request targets the auth token endpoint.
pub fn is_token_request(target: &RequestTarget) -> bool {
    target.path.contains(TOKEN_SEGMENT)
}

/// Build the outbound token request: same path and query on `auth_origin`.
pub fn token_request(
    method: &Method,
    inbound: &HeaderMap,
    body: Body,
    target: &RequestTarget,
    auth_origin: &str,
) -> Result<OutboundRequest> {
    let url = target.on_origin(auth_origin)?;
    let headers = curated_request_headers(inbound, &authority(&url))?;

    Ok(OutboundRequest::new(method.clone(), url)
        .headers(headers)
        .inbound_body(method, inbound, body))
}

/// Relay a token request; the auth response is returned unmodified.
pub async fn forward(
    client: &UpstreamClient,
    ctx: &RequestContext,
    request: OutboundRequest,
) -> Result<UpstreamResponse> {
    tracing::debug!(
        request_id = %ctx.request_id,
        url = %request.url,
        "Forwarding token request"
    );
    metrics::record_token_request();

    client.send(request, RedirectMode::Manual).await
}
