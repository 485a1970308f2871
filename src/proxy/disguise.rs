//! Responses shown to browsers instead of registry API output.

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderValue, Response, StatusCode};

use crate::config::{DisguiseConfig, ProxyConfig};
use crate::error::Result;
use crate::http::context::RequestContext;
use crate::observability::metrics;
use crate::proxy::pages;
use crate::proxy::rewrite::RequestTarget;
use crate::security::headers::passthrough_request_headers;
use crate::upstream::client::{authority, parse_url};
use crate::upstream::{OutboundRequest, RedirectMode, UpstreamClient};

const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Built-in pages selectable through `disguise.url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPage {
    Nginx,
    Help,
}

/// What a disguised request receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisguiseAction {
    /// 302 to a fixed URL.
    Redirect(String),
    StaticPage(StaticPage),
    /// Fetch an arbitrary URL and relay it.
    ForwardTo(String),
    /// Relay the same path from the Docker Hub web registry.
    HubFallback,
}

impl DisguiseAction {
    /// `url302` wins over `url`; with neither set, fall back to the hub.
    pub fn from_config(config: &DisguiseConfig) -> Self {
        if !config.url302.is_empty() {
            return DisguiseAction::Redirect(config.url302.clone());
        }

        if !config.url.is_empty() {
            return match config.url.to_ascii_lowercase().as_str() {
                "nginx" => DisguiseAction::StaticPage(StaticPage::Nginx),
                "help" => DisguiseAction::StaticPage(StaticPage::Help),
                _ => DisguiseAction::ForwardTo(config.url.clone()),
            };
        }

        DisguiseAction::HubFallback
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            DisguiseAction::Redirect(_) => "redirect",
            DisguiseAction::StaticPage(StaticPage::Nginx) => "nginx",
            DisguiseAction::StaticPage(StaticPage::Help) => "help",
            DisguiseAction::ForwardTo(_) => "forward",
            DisguiseAction::HubFallback => "hub_fallback",
        }
    }
}

/// Produce the disguise response for a browser-style request.
pub async fn respond(
    client: &UpstreamClient,
    ctx: &RequestContext,
    config: &ProxyConfig,
    parts: &Parts,
    body: Body,
) -> Result<Response<Body>> {
    let action = DisguiseAction::from_config(&config.disguise);
    metrics::record_disguise(action.kind());
    tracing::debug!(
        request_id = %ctx.request_id,
        action = action.kind(),
        path = %parts.uri.path(),
        "Serving disguise response"
    );

    match action {
        DisguiseAction::Redirect(location) => redirect(&location),
        DisguiseAction::StaticPage(StaticPage::Nginx) => html(pages::nginx_page().to_string()),
        DisguiseAction::StaticPage(StaticPage::Help) => html(pages::help_page(&config.disguise.mirrors)),
        DisguiseAction::ForwardTo(target) => {
            let url = parse_url(&target)?;
            let request = OutboundRequest::new(parts.method.clone(), url)
                .headers(passthrough_request_headers(&parts.headers))
                .inbound_body(&parts.method, &parts.headers, body);
            client.send(request, RedirectMode::Follow).await
        }
        DisguiseAction::HubFallback => {
            let url = RequestTarget::from_uri(&parts.uri).on_origin(&config.upstream.hub_fallback_origin)?;
            let mut headers = passthrough_request_headers(&parts.headers);
            headers.insert(header::HOST, HeaderValue::from_str(&authority(&url))?);

            let request = OutboundRequest::new(parts.method.clone(), url)
                .headers(headers)
                .inbound_body(&parts.method, &parts.headers, body);
            client.send(request, RedirectMode::Follow).await
        }
    }
}

fn redirect(location: &str) -> Result<Response<Body>> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_str(location)?);
    Ok(response)
}

fn html(page: String) -> Result<Response<Body>> {
    let mut response = Response::new(Body::from(page));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    Ok(response)
}
