//! CORS headers of the API routes.
//!
//! Every `/api` response carries the permissive API-wide set; the
//! diagnostic routes add their own, stricter values, which take
//! precedence.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Headers allowed on API requests.
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-CSRF-Token, X-Requested-With";

/// API-wide CORS headers.
pub const API_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("access-control-allow-headers", ALLOW_HEADERS),
    ("access-control-allow-credentials", "true"),
];

/// Headers of `/api/ping` and its preflight.
pub const PING_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, OPTIONS"),
    ("access-control-allow-headers", ALLOW_HEADERS),
    ("access-control-allow-credentials", "true"),
    ("access-control-max-age", "86400"),
];

/// Extra headers of the ping reply itself.
pub const PING_REPLY_HEADERS: &[(&str, &str)] = &[
    ("cache-control", "no-store"),
    ("x-content-type-options", "nosniff"),
];

/// Headers of `/api/test` and its preflight.
pub const TEST_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-credentials", "true"),
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET,OPTIONS,PATCH,DELETE,POST,PUT"),
    (
        "access-control-allow-headers",
        "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version, Authorization",
    ),
];

/// Builds a header map from static pairs.
#[must_use]
pub fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Empty 204 answer to a preflight.
#[must_use]
pub fn preflight_response(pairs: &[(&'static str, &'static str)]) -> Response {
    (StatusCode::NO_CONTENT, header_map(pairs)).into_response()
}

/// Answers `/api` requests that match no route. Any preflight gets the
/// API-wide 204; everything else is a 404.
pub async fn api_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        preflight_response(API_HEADERS)
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Adds the API-wide CORS headers a handler did not set itself.
pub async fn api_cors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for &(name, value) in API_HEADERS {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from_static(value));
    }
    response
}
