//! Secret generation for staff keys and enrollment tokens.

use base64::{engine::general_purpose, Engine as _};
use rand::{thread_rng, Rng};

/// Generates a staff key secret with 256 bits of entropy.
///
/// The key is formatted as `ck-{base64url_encoded_random_bytes}` where the
/// random bytes are 32 bytes of cryptographically secure random data.
pub fn generate_staff_key() -> String {
    let mut key_bytes = [0u8; 32];
    thread_rng().fill(&mut key_bytes);

    format!("ck-{}", general_purpose::URL_SAFE_NO_PAD.encode(key_bytes))
}

/// Generates an enrollment token secret.
///
/// Shorter than staff keys (128 bits) since tokens are single-use and
/// time-boxed, but still formatted for safe embedding in a URL.
pub fn generate_enrollment_token() -> String {
    let mut token_bytes = [0u8; 16];
    thread_rng().fill(&mut token_bytes);

    format!("wt-{}", general_purpose::URL_SAFE_NO_PAD.encode(token_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_staff_key_format() {
        let key = generate_staff_key();

        assert!(key.starts_with("ck-"));
        // "ck-" (3) + base64url(32 bytes) (43)
        assert_eq!(key.len(), 46);

        let key_part = &key[3..];
        assert!(key_part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!key.contains('='));
    }

    #[test]
    fn test_enrollment_token_format() {
        let token = generate_enrollment_token();

        assert!(token.starts_with("wt-"));
        // "wt-" (3) + base64url(16 bytes) (22)
        assert_eq!(token.len(), 25);
        assert!(!token.contains('='));
    }

    #[test]
    fn test_secrets_are_unique() {
        let mut seen = HashSet::new();

        for _ in 0..1000 {
            assert!(seen.insert(generate_staff_key()), "Generated duplicate staff key");
            assert!(seen.insert(generate_enrollment_token()), "Generated duplicate token");
        }
    }
}
