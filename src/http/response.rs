//! Response handling and transformation.
//!
//! # Responsibilities
//! - Point `Www-Authenticate` challenges back at this proxy
//! - Detect `Location` redirects that must be re-proxied internally
//! - Apply the client-facing header policy
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Challenge rewriting is a literal substring replacement
//! - A redirected response is dropped unread; only its `Location` matters

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::error::{ProxyError, Result};
use crate::http::context::RequestContext;
use crate::security::headers::apply_client_policy;
use crate::upstream::UpstreamResponse;

/// Outcome of rewriting a registry response.
pub enum RegistryResponse {
    /// Ready to send to the client.
    Ready(UpstreamResponse),
    /// Upstream redirected; re-proxy this target instead.
    Redirect(Url),
}

/// Replace every occurrence of `auth_origin` in `Www-Authenticate` values
/// with `public_origin`.
pub fn rewrite_challenge(
    headers: &mut HeaderMap,
    auth_origin: &str,
    public_origin: &str,
) -> Result<()> {
    if auth_origin.is_empty() || !headers.contains_key(header::WWW_AUTHENTICATE) {
        return Ok(());
    }

    let mut rewritten = Vec::new();
    for value in headers.get_all(header::WWW_AUTHENTICATE) {
        match value.to_str() {
            Ok(text) => rewritten.push(HeaderValue::from_str(&text.replace(auth_origin, public_origin))?),
            Err(_) => rewritten.push(value.clone()),
        }
    }

    headers.remove(header::WWW_AUTHENTICATE);
    for value in rewritten {
        headers.append(header::WWW_AUTHENTICATE, value);
    }
    Ok(())
}

/// Absolute redirect target from a `Location` header, resolved against the
/// URL that produced the response.
pub fn redirect_target(headers: &HeaderMap, base: &Url) -> Result<Option<Url>> {
    let Some(location) = headers.get(header::LOCATION) else {
        return Ok(None);
    };

    let location = String::from_utf8_lossy(location.as_bytes());
    base.join(&location)
        .map(Some)
        .map_err(|e| ProxyError::malformed_url(location.as_ref(), e))
}

/// Post-process a response from the registry upstream at `upstream_url`.
pub fn rewrite_registry_response(
    mut response: UpstreamResponse,
    ctx: &RequestContext,
    auth_origin: &str,
    upstream_url: &Url,
) -> Result<RegistryResponse> {
    rewrite_challenge(response.headers_mut(), auth_origin, &ctx.public_origin)?;

    if let Some(target) = redirect_target(response.headers(), upstream_url)? {
        tracing::debug!(
            request_id = %ctx.request_id,
            status = %response.status(),
            target = %target,
            "Upstream redirected, re-proxying"
        );
        return Ok(RegistryResponse::Redirect(target));
    }

    apply_client_policy(response.headers_mut());
    Ok(RegistryResponse::Ready(response))
}
