use crate::config::cookie::CookieConfig;
use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "session";

fn append_attributes(config: &CookieConfig, cookie: &mut String) {
    cookie.push_str("; HttpOnly; SameSite=");
    cookie.push_str(config.same_site);

    if config.secure {
        cookie.push_str("; Secure");
    }

    if let Some(domain) = &config.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
}

/// `Set-Cookie` value carrying the session token.
pub fn build_session_cookie(config: &CookieConfig, value: &str, max_age_seconds: u64) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={value}; Path=/; Max-Age={max_age_seconds}");
    append_attributes(config, &mut cookie);
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session.
pub fn build_clear_cookie(config: &CookieConfig) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    append_attributes(config, &mut cookie);
    cookie
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie_header| {
            cookie_header.split(';').find_map(|cookie| {
                let (key, value) = cookie.trim().split_once('=')?;
                if key.trim() == name && !value.trim().is_empty() {
                    Some(value.trim().to_string())
                } else {
                    None
                }
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = build_session_cookie(&CookieConfig::default(), "abc", 60);
        assert!(cookie.starts_with("session=abc; Path=/; Max-Age=60"));
        assert!(cookie.contains("HttpOnly; SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = build_clear_cookie(&CookieConfig::default());
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn secure_and_domain_attributes() {
        let config = CookieConfig::new(false, "None", Some("example.com".to_string()));
        let cookie = build_session_cookie(&config, "abc", 60);
        assert!(cookie.contains("SameSite=None; Secure; Domain=example.com"));
    }

    #[test]
    fn extract_from_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok.en.value; lang=en"),
        );
        assert_eq!(
            extract_cookie(&headers, SESSION_COOKIE).as_deref(),
            Some("tok.en.value")
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE), None);
    }
}
