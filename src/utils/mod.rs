pub mod password;
pub mod url_validator;

/// Length of generated short codes and user ids.
pub const SHORT_CODE_LENGTH: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 生成随机短码：每个字符从 62 个字母数字中独立均匀抽取
pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Generates a code of the standard short-code length.
pub fn generate_short_code() -> String {
    generate_random_code(SHORT_CODE_LENGTH)
}

/// True when `code` has the exact shape of a generated short code.
///
/// Used to turn obviously malformed path segments into a 404 before they
/// reach the registry.
pub fn is_valid_short_code(code: &str) -> bool {
    code.len() == SHORT_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
