use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_VERSION_PREFIX: &str = "v1,";

/// Computes the provider signature over `id.timestamp.body`, base64 encoded.
pub fn sign(id: &str, timestamp: &str, body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verifies a provider signature header against the raw request body.
///
/// The header carries a `v1,` version prefix which is stripped before
/// comparison; a bare signature is compared as-is. The body must be the
/// exact bytes received on the wire since any re-serialization would
/// change the signed payload. Comparison is constant-time.
pub fn verify(id: &str, timestamp: &str, body: &[u8], secret: &str, signature: &str) -> bool {
    let provided = signature
        .strip_prefix(SIGNATURE_VERSION_PREFIX)
        .unwrap_or(signature);
    let expected = sign(id, timestamp, body, secret);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    #[test]
    fn valid_signature_round_trips() {
        let body = br#"{"event":"payment.succeeded","data":{"id":"p1"}}"#;
        let signature = sign("msg_1", "1700000000", body, SECRET);
        let header = format!("v1,{}", signature);

        assert!(verify("msg_1", "1700000000", body, SECRET, &header));
    }

    #[test]
    fn bare_signature_without_prefix_is_accepted() {
        let body = b"{}";
        let signature = sign("msg_1", "1700000000", body, SECRET);

        assert!(verify("msg_1", "1700000000", body, SECRET, &signature));
    }

    #[test]
    fn mutated_body_byte_fails() {
        let body = b"{\"event\":\"payment.succeeded\"}".to_vec();
        let header = format!("v1,{}", sign("msg_1", "1700000000", &body, SECRET));

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert!(
                !verify("msg_1", "1700000000", &tampered, SECRET, &header),
                "mutation at byte {} should invalidate the signature",
                i
            );
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"{}";
        let header = format!("v1,{}", sign("msg_1", "1700000000", body, "other_secret"));

        assert!(!verify("msg_1", "1700000000", body, SECRET, &header));
    }

    #[test]
    fn mismatched_id_or_timestamp_fails() {
        let body = b"{}";
        let header = format!("v1,{}", sign("msg_1", "1700000000", body, SECRET));

        assert!(!verify("msg_2", "1700000000", body, SECRET, &header));
        assert!(!verify("msg_1", "1700000001", body, SECRET, &header));
    }

    #[test]
    fn garbage_signature_fails() {
        assert!(!verify("msg_1", "1700000000", b"{}", SECRET, "v1,garbage"));
        assert!(!verify("msg_1", "1700000000", b"{}", SECRET, ""));
    }

    #[test]
    fn prefix_is_stripped_not_required() {
        let body = b"{}";
        let signature = sign("msg_1", "1700000000", body, SECRET);

        // A header that happens to start with the prefix loses it, so a
        // signature whose content begins with "v1," would need doubling.
        let doubled = format!("v1,v1,{}", signature);
        assert!(!verify("msg_1", "1700000000", body, SECRET, &doubled));
    }
}
