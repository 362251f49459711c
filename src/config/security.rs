use super::parse_bool_env;
use axum::http::HeaderValue;
use std::env;

const DEFAULT_CSP_POLICY: &str = "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; object-src 'none'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; connect-src 'self'";

/// Response headers applied by `security_headers_middleware`.
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub csp: HeaderValue,
    pub enable_hsts: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            csp: HeaderValue::from_static(DEFAULT_CSP_POLICY),
            enable_hsts: true,
        }
    }
}

impl SecurityHeadersConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw_csp) = env::var("CSP_POLICY") {
            match HeaderValue::from_str(&raw_csp) {
                Ok(csp) => cfg.csp = csp,
                Err(err) => tracing::warn!(
                    "Invalid CSP_POLICY value ({}), falling back to default policy",
                    err
                ),
            }
        }
        cfg.enable_hsts = parse_bool_env("ENABLE_HSTS", cfg.enable_hsts);

        cfg
    }
}
