//! Time-based one-time codes (RFC 6238)

use crate::TotpError;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// Seconds each code stays valid
pub const TOTP_STEP_SECS: u64 = 30;

/// Digits per code
pub const TOTP_DIGITS: u32 = 6;

/// One-time code generator for a shared secret
#[derive(Clone)]
pub struct Totp {
    key: Vec<u8>,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp").field("key", &"<redacted>").finish()
    }
}

impl Totp {
    /// Creates a generator from a base32 seed
    ///
    /// Case, spaces and `=` padding are ignored.
    pub fn from_base32(secret: &str) -> Result<Self, TotpError> {
        let cleaned: String = secret
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.is_empty() {
            return Err(TotpError::EmptySecret);
        }

        let key = BASE32_NOPAD
            .decode(cleaned.as_bytes())
            .map_err(|e| TotpError::InvalidSecret(e.to_string()))?;

        Ok(Self { key })
    }

    /// Code for an arbitrary Unix time
    pub fn code_at(&self, unix_secs: u64) -> Result<String, TotpError> {
        let counter = unix_secs / TOTP_STEP_SECS;

        let mut mac = HmacSha1::new_from_slice(&self.key)
            .map_err(|e| TotpError::InvalidSecret(e.to_string()))?;
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = u32::from_be_bytes([
            digest[offset] & 0x7f,
            digest[offset + 1],
            digest[offset + 2],
            digest[offset + 3],
        ]);

        Ok(format!(
            "{:0width$}",
            binary % 10u32.pow(TOTP_DIGITS),
            width = TOTP_DIGITS as usize
        ))
    }

    /// Code for the current time
    pub fn now(&self) -> Result<String, TotpError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TotpError::ClockSkew)?
            .as_secs();
        self.code_at(secs)
    }
}
