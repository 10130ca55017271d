//! 密码哈希工具模块
//!
//! 使用 Argon2id 算法进行密码哈希和验证。`CredentialHasher` is the seam the
//! user store depends on, so the hashing primitive stays swappable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// 密码哈希错误
#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    VerifyError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::VerifyError(msg) => write!(f, "Password verify error: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Opaque `hash` / `verify` capability.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;
    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError>;
}

/// Argon2id hasher. `Default` uses the argon2 crate's recommended parameters.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    params: Option<Params>,
}

impl Argon2Hasher {
    /// Hasher with explicit cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(
        m_cost_kib: u32,
        t_cost: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost_kib, t_cost, parallelism, None)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Self {
            params: Some(params),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        match &self.params {
            Some(params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            None => Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        verify_password(plaintext, digest)
    }
}

/// 验证密码是否匹配哈希
///
/// The cost parameters are read back from the PHC string, so digests made with
/// any `Argon2Hasher` configuration verify here.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 检测字符串是否是 Argon2 哈希格式
pub fn is_argon2_hash(s: &str) -> bool {
    s.starts_with("$argon2")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::with_params(64, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let password = "test_password_123";
        let hash = Argon2Hasher::default()
            .hash(password)
            .expect("hash should succeed");

        assert!(is_argon2_hash(&hash));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong_password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_custom_params_roundtrip() {
        let hasher = cheap();
        let digest = hasher.hash("secret").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("secret", &digest).unwrap());
        assert!(!hasher.verify("Secret", &digest).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hasher = cheap();
        let a = hasher.hash("secret").unwrap();
        let b = hasher.hash("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_is_verify_error() {
        assert!(matches!(
            verify_password("secret", "not-a-phc-string"),
            Err(PasswordError::VerifyError(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        // memory must be at least 8 KiB per lane
        assert!(Argon2Hasher::with_params(1, 1, 1).is_err());
    }
}
