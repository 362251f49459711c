use super::parse_bool_env;
use chrono::Duration;
use std::env;

const DEFAULT_VERIFICATION_CODE_TTL_SECONDS: i64 = 600;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 3600;

/// How password reset tokens are produced and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenMode {
    /// Random token whose hash and expiry live on the user row. Single use.
    Stored,
    /// Self-describing HMAC-signed token. Nothing is stored, so a token stays
    /// valid until it ages out, even after it has been used.
    Signed,
}

impl ResetTokenMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stored" | "db" | "database" => Some(Self::Stored),
            "signed" | "stateless" => Some(Self::Signed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// `None` means verification codes never expire.
    pub verification_code_ttl: Option<Duration>,
    pub reset_mode: ResetTokenMode,
    pub reset_token_ttl: Duration,
    /// Tell the caller when a reset is requested for an unknown email.
    pub reveal_unknown_reset_email: bool,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verification_code_ttl: Some(Duration::seconds(
                DEFAULT_VERIFICATION_CODE_TTL_SECONDS,
            )),
            reset_mode: ResetTokenMode::Stored,
            reset_token_ttl: Duration::seconds(DEFAULT_RESET_TOKEN_TTL_SECONDS),
            reveal_unknown_reset_email: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = env::var("VERIFICATION_CODE_TTL_SECONDS") {
            match parse_optional_ttl(&raw) {
                Ok(ttl) => cfg.verification_code_ttl = ttl,
                Err(err) => {
                    tracing::warn!("Invalid VERIFICATION_CODE_TTL_SECONDS '{}': {}", raw, err)
                }
            }
        }

        if let Ok(raw) = env::var("RESET_TOKEN_MODE") {
            match ResetTokenMode::parse(&raw) {
                Some(mode) => cfg.reset_mode = mode,
                None => tracing::warn!(
                    "Invalid RESET_TOKEN_MODE '{}', expected stored/signed",
                    raw
                ),
            }
        }

        if let Some(seconds) = env::var("RESET_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s > 0)
        {
            cfg.reset_token_ttl = Duration::seconds(seconds);
        }

        cfg.reveal_unknown_reset_email =
            parse_bool_env("RESET_REVEAL_UNKNOWN_EMAIL", cfg.reveal_unknown_reset_email);

        if let Some(cost) = env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|c| (4..=31).contains(c))
        {
            cfg.bcrypt_cost = cost;
        }

        cfg
    }
}

fn parse_optional_ttl(raw: &str) -> Result<Option<Duration>, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("never") {
        return Ok(None);
    }

    let seconds: i64 = trimmed
        .parse()
        .map_err(|_| format!("expected seconds or 'none', got '{}'", trimmed))?;
    match seconds {
        0 => Ok(None),
        s if s < 0 => Err("ttl must not be negative".to_string()),
        s => Ok(Some(Duration::seconds(s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_zero_disables_expiry() {
        assert_eq!(parse_optional_ttl("0").unwrap(), None);
        assert_eq!(parse_optional_ttl("none").unwrap(), None);
    }

    #[test]
    fn ttl_seconds_parsed() {
        assert_eq!(
            parse_optional_ttl(" 900 ").unwrap(),
            Some(Duration::seconds(900))
        );
    }

    #[test]
    fn ttl_negative_rejected() {
        assert!(parse_optional_ttl("-5").is_err());
        assert!(parse_optional_ttl("soon").is_err());
    }

    #[test]
    fn reset_mode_aliases() {
        assert_eq!(ResetTokenMode::parse("Signed"), Some(ResetTokenMode::Signed));
        assert_eq!(ResetTokenMode::parse("stateless"), Some(ResetTokenMode::Signed));
        assert_eq!(ResetTokenMode::parse("db"), Some(ResetTokenMode::Stored));
        assert_eq!(ResetTokenMode::parse("jwt"), None);
    }

    #[test]
    fn defaults_track_expiry_and_conceal_unknown_emails() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.verification_code_ttl, Some(Duration::seconds(600)));
        assert_eq!(cfg.reset_mode, ResetTokenMode::Stored);
        assert_eq!(cfg.reset_token_ttl, Duration::seconds(3600));
        assert!(!cfg.reveal_unknown_reset_email);
    }
}
