//! Security headers middleware.

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Security headers middleware for rendered pages.
///
/// Adds the following headers to all responses:
/// - X-Content-Type-Options: nosniff
/// - X-Frame-Options: SAMEORIGIN
/// - Referrer-Policy: same-origin
/// - Cache-Control: no-store (pages embed a freshly generated room ID)
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("SAMEORIGIN"));
    // Room links are capabilities; keep them out of third-party referrers
    headers.insert("Referrer-Policy", HeaderValue::from_static("same-origin"));

    if !headers.contains_key("Cache-Control") {
        headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    }

    response
}
