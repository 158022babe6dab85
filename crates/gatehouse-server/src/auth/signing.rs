//! HMAC-SHA256 signatures for the approval cookie.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// No signing secret configured. Fatal at startup.
    #[error("cookie signing secret is missing")]
    MissingSecret,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Keyed signer. Construction is the only fallible step.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl CookieSigner {
    pub fn new(secret: &str) -> Result<Self, SigningError> {
        if secret.trim().is_empty() {
            return Err(SigningError::MissingSecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Lower-case hex HMAC of `data`. Deterministic per (secret, data).
    pub fn sign(&self, data: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a hex signature. Undecodable hex is a mismatch.
    pub fn verify(&self, signature_hex: &str, data: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(data.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CookieSigner { .. }")
    }
}

/// One-shot form of [`CookieSigner::sign`].
pub fn sign(secret: &str, data: &str) -> Result<String, SigningError> {
    Ok(CookieSigner::new(secret)?.sign(data))
}

/// One-shot form of [`CookieSigner::verify`].
pub fn verify(secret: &str, signature_hex: &str, data: &str) -> Result<bool, SigningError> {
    Ok(CookieSigner::new(secret)?.verify(signature_hex, data))
}
