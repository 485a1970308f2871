//! Generic re-proxy of redirect targets (blob storage, CDN URLs).
//!
//! A registry `Location` is never handed to the client. The target is
//! fetched here instead, following further 3xx hops up to the configured
//! bound.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode};
use url::Url;

use crate::error::{ProxyError, Result};
use crate::http::context::RequestContext;
use crate::http::response::redirect_target;
use crate::observability::metrics;
use crate::security::headers::{apply_client_policy, passthrough_request_headers, preflight_headers};
use crate::upstream::{OutboundRequest, RedirectMode, UpstreamClient, UpstreamResponse};

/// Header carrying a length-validation failure.
pub const ERROR_HEADER: &str = "--error";

/// CORS preflight: `OPTIONS` carrying `Access-Control-Request-Headers`.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    *method == Method::OPTIONS && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS)
}

/// 204 answering a CORS preflight.
pub fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    *response.headers_mut() = preflight_headers();
    response
}

/// Fetch `target` on behalf of the client and return the final response.
///
/// The first fetch counts as hop 1; a redirect past `max_redirects` hops
/// fails with [`ProxyError::TooManyRedirects`].
pub async fn reproxy(
    client: &UpstreamClient,
    ctx: &RequestContext,
    method: &Method,
    inbound: &HeaderMap,
    target: Url,
    max_redirects: u32,
    expected_len: Option<&str>,
) -> Result<Response<Body>> {
    if is_preflight(method, inbound) {
        return Ok(preflight_response());
    }

    let headers = passthrough_request_headers(inbound);
    let mut target = target;
    let mut hops = 1;

    loop {
        metrics::record_redirect_hop();
        tracing::debug!(
            request_id = %ctx.request_id,
            hop = hops,
            target = %target,
            "Re-proxying redirect target"
        );

        let request = OutboundRequest::new(method.clone(), target.clone()).headers(headers.clone());
        let response = client.send(request, RedirectMode::Manual).await?;

        if response.status().is_redirection() {
            if let Some(next) = redirect_target(response.headers(), &target)? {
                if hops >= max_redirects {
                    tracing::warn!(
                        request_id = %ctx.request_id,
                        limit = max_redirects,
                        target = %next,
                        "Redirect limit reached"
                    );
                    return Err(ProxyError::TooManyRedirects { limit: max_redirects });
                }
                hops += 1;
                target = next;
                continue;
            }
        }

        return finish(response, expected_len);
    }
}

/// Validate the body length if the caller expects one, then apply the
/// client header policy.
pub fn finish(mut response: UpstreamResponse, expected_len: Option<&str>) -> Result<Response<Body>> {
    if let Some(expected) = expected_len.filter(|e| !e.is_empty()) {
        let actual = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if actual != expected {
            return length_mismatch(response, &actual, expected);
        }
    }

    apply_client_policy(response.headers_mut());
    Ok(response)
}

fn length_mismatch(response: UpstreamResponse, actual: &str, expected: &str) -> Result<Response<Body>> {
    tracing::warn!(actual = %actual, expected = %expected, "Upstream body length mismatch");

    let message = format!("bad len: {}, except: {}", actual, expected);
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(ERROR_HEADER), HeaderValue::from_str(&message)?);
    headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(ERROR_HEADER));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    let mut rejected = Response::new(response.into_body());
    *rejected.status_mut() = StatusCode::BAD_REQUEST;
    *rejected.headers_mut() = headers;
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(content_length: Option<&str>) -> UpstreamResponse {
        let mut response = Response::new(Body::from("blob"));
        if let Some(len) = content_length {
            response
                .headers_mut()
                .insert(header::CONTENT_LENGTH, HeaderValue::from_str(len).unwrap());
        }
        response
            .headers_mut()
            .insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'none'"));
        response
    }

    #[test]
    fn test_preflight() {
        let mut headers = HeaderMap::new();
        assert!(!is_preflight(&Method::OPTIONS, &headers));

        headers.insert(header::ACCESS_CONTROL_REQUEST_HEADERS, HeaderValue::from_static("authorization"));
        assert!(is_preflight(&Method::OPTIONS, &headers));
        assert!(!is_preflight(&Method::GET, &headers));

        let response = preflight_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "1728000");
    }

    #[test]
    fn test_finish_applies_policy() {
        let response = finish(upstream(Some("4")), None).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=1500");
        assert!(!response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[test]
    fn test_finish_matching_length() {
        let response = finish(upstream(Some("4")), Some("4")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_finish_length_mismatch() {
        let response = finish(upstream(Some("4")), Some("10")).unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[ERROR_HEADER], "bad len: 4, except: 10");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS], ERROR_HEADER);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"blob");
    }

    #[test]
    fn test_finish_missing_length_is_mismatch() {
        let response = finish(upstream(None), Some("10")).unwrap();
        assert_eq!(response.headers()[ERROR_HEADER], "bad len: , except: 10");
    }
}
