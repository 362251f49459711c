use anyhow::Result;
use std::env;

const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 3600;
/// Upper bound for `SESSION_TTL_SECONDS` (ten years).
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: u64,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable must be set"))?;

        let mut cfg = Self::new(secret)?;
        if let Ok(raw) = env::var("SESSION_TTL_SECONDS") {
            cfg.ttl_seconds = parse_ttl(&raw)?;
        }
        Ok(cfg)
    }

    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be at least 32 characters"
            ));
        }

        Ok(Self {
            secret,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }
}

fn parse_ttl(raw: &str) -> Result<u64> {
    let ttl: u64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid SESSION_TTL_SECONDS '{}': {}", raw, e))?;
    if ttl == 0 || ttl > MAX_TTL_SECONDS {
        return Err(anyhow::anyhow!(
            "SESSION_TTL_SECONDS must be between 1 and {}",
            MAX_TTL_SECONDS
        ));
    }
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_rejected() {
        assert!(SessionConfig::new("too-short").is_err());
    }

    #[test]
    fn ttl_bounds() {
        assert_eq!(parse_ttl(" 3600 ").unwrap(), 3600);
        assert_eq!(parse_ttl(&MAX_TTL_SECONDS.to_string()).unwrap(), MAX_TTL_SECONDS);
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl(&u64::MAX.to_string()).is_err());
        assert!(parse_ttl("soon").is_err());
    }

    #[test]
    fn default_ttl_is_one_week() {
        let cfg = SessionConfig::new("x".repeat(32)).unwrap();
        assert_eq!(cfg.ttl_seconds, 7 * 24 * 3600);
    }
}
