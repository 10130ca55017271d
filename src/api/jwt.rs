use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TinylinkerError};

use super::constants::SESSION_TOKEN_TYPE;

/// Session Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// Issues and validates HS256 session tokens
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// None when the configured lifetime does not fit a `TimeDelta`
    ttl: Option<TimeDelta>,
}

impl SessionTokenService {
    pub fn new(secret: &str, max_age_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: i64::try_from(max_age_hours)
                .ok()
                .and_then(TimeDelta::try_hours),
        }
    }

    /// Token carrying `user_id` as subject
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let exp = self
            .ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| TinylinkerError::internal("Session lifetime is out of range"))?;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify signature, expiry and token type
    pub fn validate(
        &self,
        token: &str,
    ) -> std::result::Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != SESSION_TOKEN_TYPE {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "test_secret_key_32_bytes_long!!";

    fn create_test_service() -> SessionTokenService {
        SessionTokenService::new(SECRET, 24)
    }

    fn sign(claims: &SessionClaims) -> String {
        let encoding_key = EncodingKey::from_secret(SECRET.as_bytes());
        encode(&Header::default(), claims, &encoding_key).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue("aJ48lW").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "aJ48lW");
        assert_eq!(claims.token_type, "session");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = create_test_service();
        let a = service.issue("aJ48lW").unwrap();
        let b = service.issue("aJ48lW").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        for hours in [u64::MAX, 1 << 40] {
            let service = SessionTokenService::new(SECRET, hours);
            assert!(matches!(
                service.issue("aJ48lW"),
                Err(TinylinkerError::Internal(_))
            ));
        }
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate("invalid.token.here").is_err());
        assert!(service.validate("aJ48lW").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = SessionTokenService::new("different_secret_key_32_bytes!!", 24);

        let token = service1.issue("aJ48lW").unwrap();
        assert!(service2.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let service = create_test_service();
        let now = Utc::now();
        let token = sign(&SessionClaims {
            sub: "aJ48lW".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        });

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // 过期时间需超过默认 leeway
        let now = Utc::now();
        let token = sign(&SessionClaims {
            sub: "aJ48lW".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
        });

        let result = service.validate(&token);
        assert!(
            result.is_err(),
            "Expected expired token to be rejected, but got: {:?}",
            result
        );
    }
}
