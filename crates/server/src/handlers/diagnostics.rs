//! `/api/ping` and `/api/test`.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, Method, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::SecondsFormat;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::cors::{PING_HEADERS, PING_REPLY_HEADERS, TEST_HEADERS, header_map, preflight_response};
use crate::state::AppState;

/// Answers `GET /api/ping` with a timestamp and what the server saw of
/// the request.
pub async fn ping(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let origin = header_str(&headers, header::ORIGIN).unwrap_or("no-origin");
    debug!(origin, "ping received");

    let mut response_headers = header_map(PING_HEADERS);
    response_headers.extend(header_map(PING_REPLY_HEADERS));

    let body = json!({
        "message": "pong",
        "timestamp": state.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "debug": {
            "url": request_url(&headers, &uri),
            "origin": origin,
            "method": method.as_str(),
            "requestHeaders": headers_json(&headers),
            "responseHeaders": headers_json(&response_headers),
        }
    });

    (response_headers, Json(body)).into_response()
}

/// Answers the `/api/ping` preflight.
pub async fn ping_preflight() -> Response {
    preflight_response(PING_HEADERS)
}

/// Answers `GET /api/test` with request details and the deployment label.
pub async fn test(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let pick = |name: header::HeaderName| header_str(&headers, name).map(str::to_string);

    let body = json!({
        "status": "success",
        "message": "Test API reachable",
        "timestamp": state.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "path": uri.path(),
        "query": query,
        "headers": {
            "host": pick(header::HOST),
            "origin": pick(header::ORIGIN),
            "referer": pick(header::REFERER),
            "user-agent": pick(header::USER_AGENT),
            "content-type": pick(header::CONTENT_TYPE),
            "accept": pick(header::ACCEPT),
        },
        "env": state.node_env,
    });

    (header_map(TEST_HEADERS), Json(body)).into_response()
}

/// Answers the `/api/test` preflight.
pub async fn test_preflight() -> Response {
    preflight_response(TEST_HEADERS)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    header_str(headers, header::HOST).map_or_else(
        || uri.to_string(),
        |host| format!("http://{host}{uri}"),
    )
}

fn headers_json(headers: &HeaderMap) -> Value {
    let map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or("<binary>").to_string()),
            )
        })
        .collect();
    Value::Object(map)
}
