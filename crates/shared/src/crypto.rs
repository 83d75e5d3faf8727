//! Hashing and HMAC helpers.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs `message` with `secret` and returns the HMAC-SHA256 tag as hex.
pub fn sign_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex HMAC tag produced by [`sign_hex`] in constant time.
pub fn verify_hex(secret: &str, message: &str, tag_hex: &str) -> bool {
    let Ok(tag) = hex::decode(tag_hex) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    mac.verify_slice(&tag).is_ok()
}

/// Unsubscribe token for a newsletter address.
///
/// The address is normalized before signing so casing in the link does not matter.
pub fn unsubscribe_token(secret: &str, email: &str) -> String {
    sign_hex(secret, &format!("unsubscribe:{}", email.trim().to_lowercase()))
}

/// Checks an unsubscribe token issued by [`unsubscribe_token`].
pub fn verify_unsubscribe_token(secret: &str, email: &str, token: &str) -> bool {
    verify_hex(
        secret,
        &format!("unsubscribe:{}", email.trim().to_lowercase()),
        token,
    )
}

/// Compares a presented secret with the expected one without leaking timing.
///
/// Both sides are MACed under the expected secret, so the comparison is a fixed-size
/// constant-time tag check regardless of the presented length.
pub fn secrets_match(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let tag = sign_hex(expected, expected);
    verify_hex(expected, presented, &tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_hex_known_vector() {
        // RFC 4231 test case 2.
        assert_eq!(
            sign_hex("Jefe", "what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let tag = sign_hex("secret", "hello");
        assert_eq!(tag.len(), 64);
        assert!(verify_hex("secret", "hello", &tag));
        assert!(!verify_hex("secret", "hello!", &tag));
        assert!(!verify_hex("other", "hello", &tag));
    }

    #[test]
    fn test_verify_rejects_garbage_tag() {
        assert!(!verify_hex("secret", "hello", "not-hex"));
        assert!(!verify_hex("secret", "hello", ""));
    }

    #[test]
    fn test_unsubscribe_token_ignores_case_and_whitespace() {
        let token = unsubscribe_token("k", "Jane@Example.com ");
        assert!(verify_unsubscribe_token("k", "jane@example.com", &token));
        assert!(!verify_unsubscribe_token("k", "john@example.com", &token));
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("cron-secret", "cron-secret"));
        assert!(!secrets_match("cron-secret", "cron-secreT"));
        assert!(!secrets_match("cron-secret", ""));
    }

    #[test]
    fn test_secrets_match_empty_expected_never_matches() {
        assert!(!secrets_match("", ""));
        assert!(!secrets_match("", "anything"));
    }
}
