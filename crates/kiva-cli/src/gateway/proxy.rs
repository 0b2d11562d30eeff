//! Reverse-proxy forwarding.
//!
//! The forward is transparent: method, query, headers, and body go upstream
//! unchanged except for hop-by-hop headers and, with change-origin, `Host`
//! and `Origin`. The upstream response is relayed as-is.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use kiva_config::ProxyRoute;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Headers scoped to a single connection (RFC 9110 §7.6.1).
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("upstream {url} unavailable: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProxyError::Body(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ProxyError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Copy `headers` minus hop-by-hop and length headers.
fn relayable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name) && **name != header::CONTENT_LENGTH)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Headers sent upstream for a request on `route`.
pub fn upstream_headers(route: &ProxyRoute, incoming: &HeaderMap) -> HeaderMap {
    let mut headers = relayable(incoming);
    if route.change_origin {
        if let Ok(host) = HeaderValue::from_str(route.target_authority()) {
            headers.insert(header::HOST, host);
        }
        if headers.contains_key(header::ORIGIN) {
            if let Ok(origin) = HeaderValue::from_str(&route.target) {
                headers.insert(header::ORIGIN, origin);
            }
        }
    }
    headers
}

/// Forward `req` along `route` and relay the upstream response.
#[instrument(skip(client, route, req), fields(context = %route.context, path = %req.uri().path()))]
pub async fn forward(client: &Client, route: &ProxyRoute, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let url = route.upstream_url(parts.uri.path(), parts.uri.query());
    debug!(url = %url, method = %parts.method, "forwarding to upstream");

    let body = to_bytes(body, usize::MAX).await?;
    let upstream = client
        .request(parts.method, &url)
        .headers(upstream_headers(route, &parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|source| {
            warn!(url = %url, "upstream request failed: {source}");
            ProxyError::Upstream {
                url: url.clone(),
                source,
            }
        })?;

    let status = upstream.status();
    let headers = relayable(upstream.headers());
    let bytes = upstream
        .bytes()
        .await
        .map_err(|source| ProxyError::Upstream { url, source })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
