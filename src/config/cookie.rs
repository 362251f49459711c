use super::parse_bool_env;
use std::env;

/// Attributes appended to every `session` cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: &'static str,
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: "Lax",
            domain: None,
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Self {
        let same_site = parse_same_site(
            &env::var("AUTH_COOKIE_SAMESITE").unwrap_or_else(|_| "Lax".to_string()),
        );
        let secure = parse_bool_env("AUTH_COOKIE_SECURE", false);
        let domain = env::var("AUTH_COOKIE_DOMAIN")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Self::new(secure, same_site, domain)
    }

    pub fn new(secure: bool, same_site: &'static str, domain: Option<String>) -> Self {
        Self {
            // Browsers require SameSite=None cookies to also be Secure.
            secure: secure || same_site == "None",
            same_site,
            domain,
        }
    }
}

fn parse_same_site(value: &str) -> &'static str {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => "Strict",
        "none" => "None",
        _ => "Lax",
    }
}
