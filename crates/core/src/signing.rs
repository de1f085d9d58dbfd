//! HMAC signing for outbound result callbacks.
//!
//! Payloads destined for third parties are signed with HMAC-SHA256 over
//! their canonical JSON serialization. Verification recomputes the tag
//! and compares in constant time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies callback payloads with a shared secret.
pub struct CallbackSigner {
    secret: Secret<String>,
}

impl CallbackSigner {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| Error::signing(format!("Invalid HMAC key: {}", e)))
    }

    /// Hex-encoded HMAC-SHA256 over the canonical JSON form of `payload`.
    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String> {
        let data = serde_json::to_vec(payload)?;
        let mut mac = self.mac()?;
        mac.update(&data);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify a signature produced by [`sign`](Self::sign).
    ///
    /// Malformed hex, a wrong-length tag, or a mismatch all report
    /// `false`; the underlying comparison is constant-time.
    pub fn verify<T: Serialize>(&self, payload: &T, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(data) = serde_json::to_vec(payload) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(&data);
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signer() -> CallbackSigner {
        CallbackSigner::new(Secret::new("runner-secret".to_string()))
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let payload = json!({"submissionId": "sub-1", "score": 100});
        let signature = signer().sign(&payload).unwrap();
        assert!(signer().verify(&payload, &signature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = json!({"submissionId": "sub-1", "score": 100});
        let signature = signer().sign(&payload).unwrap();

        let forged = json!({"submissionId": "sub-1", "score": 0});
        assert!(!signer().verify(&forged, &signature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = json!({"submissionId": "sub-1"});
        let signature = signer().sign(&payload).unwrap();

        let other = CallbackSigner::new(Secret::new("different".to_string()));
        assert!(!other.verify(&payload, &signature));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let payload = json!({"submissionId": "sub-1"});
        assert!(!signer().verify(&payload, "not-hex"));
        assert!(!signer().verify(&payload, "deadbeef"));
        assert!(!signer().verify(&payload, ""));
    }
}
