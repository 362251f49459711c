use crate::config::session::SessionConfig;
use crate::error::{AppError, AppResult};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Issues and checks session tokens. Built once at startup and shared
/// through an axum `Extension`.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_seconds: config.ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, user_id: i32) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp() as usize;
        let exp = usize::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "Session ttl of {}s overflows the expiry timestamp",
                    self.ttl_seconds
                ))
            })?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        Ok(decode::<Claims>(token, &self.decoding, &Validation::default())?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        let config =
            SessionConfig::new("a_very_long_secret_key_that_is_at_least_32_chars").unwrap();
        SessionCodec::new(&config)
    }

    #[test]
    fn issued_token_carries_user_id() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let mut config =
            SessionConfig::new("a_very_long_secret_key_that_is_at_least_32_chars").unwrap();
        config.ttl_seconds = u64::MAX;
        let codec = SessionCodec::new(&config);
        assert!(matches!(codec.issue(1), Err(AppError::Internal(_))));
    }

    #[test]
    fn tampered_token_fails() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(codec.decode(&tampered).is_err());
    }

    #[test]
    fn token_from_other_secret_fails() {
        let other = SessionCodec::new(
            &SessionConfig::new("another_secret_key_that_is_also_32_chars_long").unwrap(),
        );
        let token = other.issue(7).unwrap();
        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "42".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(&Header::default(), &claims, &codec.encoding).unwrap();
        assert!(codec.decode(&token).is_err());
    }

    #[test]
    fn non_numeric_subject_has_no_user_id() {
        let claims = Claims {
            sub: "alice".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
