// handlers/proxy.rs - ANY /auth/api/proxy?path=... handler
//
// After login the browser holds JSESSIONID / X-CSRF-TOKEN and replays
// them through this endpoint on every legacy API call. The proxy forwards
// the method, body, session cookies and CSRF header to the legacy server
// and hands the upstream status and body straight back.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use reqwest::redirect;
use serde::Deserialize;
use serde_json::json;

use crate::bridge::enrich::CSRF_HEADER;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub path: String,
}

pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let legacy = &state.config.legacy;

    // Only server-relative paths; no absolute-URL smuggling through the proxy.
    if !params.path.starts_with('/') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "path must be relative to the legacy server root",
            })),
        )
            .into_response();
    }

    let client = match reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(legacy.request_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "proxy client construction failed");
            return bad_gateway("server error occurred");
        }
    };

    let url = legacy.endpoint(&params.path);
    let mut request = client.request(method, &url);
    if let Some(cookie) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        request = request.header(COOKIE, cookie);
    }
    if let Some(token) = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) {
        request = request.header(CSRF_HEADER, token);
    }
    if !body.is_empty() {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json");
        request = request.header(CONTENT_TYPE, content_type).body(body.to_vec());
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(%url, error = %err, "proxied legacy call failed");
            return bad_gateway("legacy server is not responding");
        }
    };

    let status = response.status();
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%url, error = %err, "proxied legacy response body unreadable");
            return bad_gateway("legacy server is not responding");
        }
    };

    let mut reply = Response::builder().status(status);
    if let Some(content_type) = content_type {
        reply = reply.header(CONTENT_TYPE, content_type);
    }
    match reply.body(axum::body::Body::from(bytes)) {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(error = %err, "proxy response assembly failed");
            bad_gateway("server error occurred")
        }
    }
}

fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}
