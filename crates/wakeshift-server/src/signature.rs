//! `X-Oura-Signature` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-oura-signature";

/// Computes the hex signature of `body` keyed by `token`.
pub fn sign(token: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(token.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against `body` in constant time. Case-insensitive
/// in the hex digits.
pub fn verify(token: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(token.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_case_2() {
        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn verify_accepts_own_signature() {
        let body = br#"{"event_type":"create","data_type":"sleep"}"#;
        let sig = sign("token", body).unwrap();
        assert!(verify("token", body, &sig));
        assert!(verify("token", body, &sig.to_uppercase()));
    }

    #[test]
    fn verify_rejects_mismatches() {
        let body = b"payload";
        let sig = sign("token", body).unwrap();
        assert!(!verify("other", body, &sig));
        assert!(!verify("token", b"payload2", &sig));
        assert!(!verify("token", body, "not-hex"));
        assert!(!verify("token", body, ""));
    }
}
