use crate::config::security::SecurityHeadersConfig;
use axum::{
    extract::Request, http::HeaderValue, middleware::Next, response::Response, Extension,
};

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Static hardening headers on every response. The CSP and HSTS parts come
/// from the injected [`SecurityHeadersConfig`].
pub async fn security_headers_middleware(
    Extension(config): Extension<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("content-security-policy", config.csp);
    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
        ("cross-origin-opener-policy", "same-origin"),
        ("cross-origin-resource-policy", "same-origin"),
    ] {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if config.enable_hsts {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}
