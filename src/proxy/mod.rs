//! Registry proxy pipeline.
//!
//! # Data Flow
//! ```text
//! RequestContext + Request
//!     → disguise.rs (browser-style paths on disguised hosts)
//!     → rewrite.rs  (encoded namespace repair)
//!     → token.rs    (`/token` → auth origin, response verbatim)
//!     → rewrite.rs  (implicit `library/` namespace, registry request)
//!     → upstream    (single fetch, redirects surfaced)
//!     → http::response (challenge rewrite, Location detection)
//!     → redirect.rs (re-proxy Location targets, bounded hops)
//! ```

pub mod disguise;
pub mod pages;
pub mod redirect;
pub mod rewrite;
pub mod token;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::error::Result;
use crate::http::context::RequestContext;
use crate::http::response::{rewrite_registry_response, RegistryResponse};
use crate::http::server::InnerState;
use crate::upstream::RedirectMode;
use rewrite::{apply_rules, RequestTarget, PRE_TOKEN_RULES, REGISTRY_RULES};

/// Run one request through the pipeline.
pub async fn handle(
    state: &InnerState,
    ctx: &RequestContext,
    request: Request<Body>,
) -> Result<Response<Body>> {
    let (parts, body) = request.into_parts();
    let config = &state.config;

    if ctx.should_disguise(state.classifier.is_browser_request(parts.uri.path())) {
        return disguise::respond(&state.client, ctx, config, &parts, body).await;
    }

    let target = apply_rules(PRE_TOKEN_RULES, RequestTarget::from_uri(&parts.uri));

    if token::is_token_request(&target) {
        let request = token::token_request(
            &parts.method,
            &parts.headers,
            body,
            &target,
            &config.upstream.auth_origin,
        )?;
        return token::forward(&state.client, ctx, request).await;
    }

    let target = apply_rules(REGISTRY_RULES, target);
    let request = rewrite::registry_request(ctx, config, &parts.method, &parts.headers, body, &target)?;
    let upstream_url = request.url.clone();
    let response = state.client.send(request, RedirectMode::Manual).await?;

    match rewrite_registry_response(response, ctx, &config.upstream.auth_origin, &upstream_url)? {
        RegistryResponse::Ready(response) => Ok(response),
        RegistryResponse::Redirect(location) => {
            redirect::reproxy(
                &state.client,
                ctx,
                &parts.method,
                &parts.headers,
                location,
                config.upstream.max_redirects,
                None,
            )
            .await
        }
    }
}
