//! One-time secrets handed to users by mail: numeric verification codes and
//! random reset tokens.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

pub const VERIFICATION_CODE_DIGITS: usize = 6;
const CODE_SPACE: u32 = 1_000_000;
const RESET_TOKEN_BYTES: usize = 32;

/// Uniformly random 6-digit code, zero padded.
pub fn generate_verification_code() -> Result<String> {
    // Largest multiple of CODE_SPACE that fits in u32; values above it are
    // redrawn so every code is equally likely.
    let limit = u32::MAX - (u32::MAX % CODE_SPACE);
    loop {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).context("OS random number generator unavailable")?;
        let n = u32::from_le_bytes(buf);
        if n < limit {
            return Ok(format!("{:0width$}", n % CODE_SPACE, width = VERIFICATION_CODE_DIGITS));
        }
    }
}

/// True if `code` looks like something `generate_verification_code` produced.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == VERIFICATION_CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

/// URL-safe random token for the stored reset flow.
pub fn generate_reset_token() -> Result<String> {
    let mut buf = [0u8; RESET_TOKEN_BYTES];
    getrandom::getrandom(&mut buf).context("OS random number generator unavailable")?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

/// Digest stored in place of a reset token. Tokens carry 256 bits of
/// entropy, so an unsalted hash is enough to keep them out of the database.
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
