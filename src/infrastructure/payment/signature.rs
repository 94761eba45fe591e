//! Payment notification signatures
//!
//! The provider signs each notification with
//! `sha512(order_id + status_code + gross_amount + server_key)`, hex-encoded.

use sha2::{Digest, Sha512};

pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a notification's `signature_key` against the shared server key.
pub fn verify_notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    signature_key: &str,
) -> bool {
    let expected = notification_signature(order_id, status_code, gross_amount, server_key);
    let given = signature_key.trim().to_ascii_lowercase();
    if expected.len() != given.len() {
        return false;
    }
    // Compare without early exit.
    expected
        .bytes()
        .zip(given.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sha512_hex() {
        let sig = notification_signature("booking-1", "200", "100.00", "secret");
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verification_accepts_only_matching_input() {
        let sig = notification_signature("booking-1", "200", "100.00", "secret");
        assert!(verify_notification_signature("booking-1", "200", "100.00", "secret", &sig));
        assert!(verify_notification_signature(
            "booking-1",
            "200",
            "100.00",
            "secret",
            &sig.to_ascii_uppercase()
        ));
        assert!(!verify_notification_signature("booking-1", "200", "999.00", "secret", &sig));
        assert!(!verify_notification_signature("booking-1", "200", "100.00", "other", &sig));
        assert!(!verify_notification_signature("booking-1", "200", "100.00", "secret", "abc"));
    }
}
