pub mod ip;
pub mod url_validator;

pub use ip::TrustedProxies;
pub use url_validator::validate_original_url;

/// Alphabet for short codes: lowercase ASCII letters and digits.
pub const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 8;

/// 6-8 characters from `CODE_ALPHABET`.
pub fn is_valid_short_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Random code of exactly `length` characters from `CODE_ALPHABET`.
pub fn generate_random_code(length: usize) -> String {
    std::iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_code_shape() {
        assert!(is_valid_short_code("google"));
        assert!(is_valid_short_code("abc12345"));
        assert!(!is_valid_short_code("abc12"));
        assert!(!is_valid_short_code("doesnotexist123"));
        assert!(!is_valid_short_code("Google"));
        assert!(!is_valid_short_code("abc-12"));
    }

    #[test]
    fn test_generated_codes_are_valid() {
        for len in MIN_CODE_LENGTH..=MAX_CODE_LENGTH {
            let code = generate_random_code(len);
            assert_eq!(code.len(), len);
            assert!(is_valid_short_code(&code));
        }
    }
}
