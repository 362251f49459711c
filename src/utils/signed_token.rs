use crate::error::{AppError, AppResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const PASSWORD_RESET_PURPOSE: &str = "password-reset";

/// Payload of a stateless password reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub issued_at: i64,
}

/// Produces `base64url(payload).base64url(hmac)` tokens.
///
/// The MAC key is derived from the application secret and a purpose string,
/// so a token minted for one purpose never verifies for another.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: &[u8], purpose: &str) -> AppResult<Self> {
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid signing key: {e}")))?;
        mac.update(purpose.as_bytes());
        Ok(Self {
            key: mac.finalize().into_bytes().to_vec(),
        })
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid signing key: {e}")))
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> AppResult<String> {
        let payload = serde_json::to_vec(payload).map_err(|e| AppError::Internal(e.into()))?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let sig = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(sig)
        ))
    }

    /// Check the signature and decode the payload. Freshness is the caller's
    /// concern.
    pub fn unsign<T: DeserializeOwned>(&self, token: &str) -> AppResult<T> {
        let invalid = || AppError::Validation("Invalid reset token".to_string());

        let (payload_b64, sig_b64) = token.split_once('.').ok_or_else(invalid)?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| invalid())?;
        let sig = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| invalid())?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&sig).map_err(|_| invalid())?;

        serde_json::from_slice(&payload).map_err(|_| invalid())
    }

    pub fn issue_reset_token(&self, email: &str, now: i64) -> AppResult<String> {
        self.sign(&ResetClaims {
            email: email.to_string(),
            issued_at: now,
        })
    }

    /// Valid while `now - issued_at <= max_age_seconds`. The same token keeps
    /// verifying for the whole window; nothing marks it used.
    pub fn verify_reset_token(
        &self,
        token: &str,
        max_age_seconds: i64,
        now: i64,
    ) -> AppResult<ResetClaims> {
        let claims: ResetClaims = self.unsign(token)?;
        if now - claims.issued_at > max_age_seconds {
            return Err(AppError::Validation("Reset token has expired".to_string()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"a_very_long_secret_key_that_is_at_least_32_chars";

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET, PASSWORD_RESET_PURPOSE).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn fresh_token_verifies() {
        let signer = signer();
        let token = signer.issue_reset_token("a@x.com", 1_000).unwrap();
        let claims = signer.verify_reset_token(&token, 3600, 1_100).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.issued_at, 1_000);
    }

    #[test]
    fn token_at_exact_max_age_still_verifies() {
        let signer = signer();
        let token = signer.issue_reset_token("a@x.com", 1_000).unwrap();
        assert!(signer.verify_reset_token(&token, 3600, 4_600).is_ok());
    }

    #[test]
    fn old_token_expires() {
        let signer = signer();
        let token = signer.issue_reset_token("a@x.com", 1_000).unwrap();
        let err = signer.verify_reset_token(&token, 3600, 4_601).unwrap_err();
        assert_eq!(message(err), "Reset token has expired");
    }

    #[test]
    fn tampered_payload_rejected() {
        let signer = signer();
        let token = signer.issue_reset_token("a@x.com", 1_000).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&ResetClaims {
                email: "victim@x.com".to_string(),
                issued_at: 1_000,
            })
            .unwrap(),
        );
        let forged = format!("{forged_payload}.{sig}");
        let err = signer.verify_reset_token(&forged, 3600, 1_000).unwrap_err();
        assert_eq!(message(err), "Invalid reset token");
    }

    #[test]
    fn other_purpose_rejected() {
        let token = TokenSigner::new(SECRET, "email-change")
            .unwrap()
            .issue_reset_token("a@x.com", 1_000)
            .unwrap();
        assert!(signer().verify_reset_token(&token, 3600, 1_000).is_err());
    }

    #[test]
    fn garbage_rejected() {
        let signer = signer();
        assert!(signer.verify_reset_token("", 3600, 0).is_err());
        assert!(signer.verify_reset_token("no-dot-here", 3600, 0).is_err());
        assert!(signer.verify_reset_token("a.b", 3600, 0).is_err());
    }
}
