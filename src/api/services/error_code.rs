//! 统一 API 错误码定义

use crate::errors::TinylinkerError;

/// API 错误码枚举
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 账户与会话错误
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 账户与会话错误 2000-2099
    AuthFailed = 2000,
    EmailTaken = 2001,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkGone = 3001,
}

impl From<&TinylinkerError> for ErrorCode {
    fn from(err: &TinylinkerError) -> Self {
        match err {
            TinylinkerError::InvalidInput(_) => ErrorCode::BadRequest,
            // same code for both so the body does not tell them apart
            TinylinkerError::NotAuthenticated(_) | TinylinkerError::NotOwner(_) => {
                ErrorCode::Forbidden
            }
            TinylinkerError::NotFound(_) => ErrorCode::LinkNotFound,
            TinylinkerError::Gone(_) => ErrorCode::LinkGone,
            TinylinkerError::AlreadyExists(_) => ErrorCode::EmailTaken,
            TinylinkerError::InvalidCredentials(_) => ErrorCode::AuthFailed,
            TinylinkerError::PersistenceDegraded(_)
            | TinylinkerError::Internal(_)
            | TinylinkerError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_variants_share_a_code() {
        assert_eq!(
            ErrorCode::from(&TinylinkerError::not_authenticated("a")),
            ErrorCode::from(&TinylinkerError::not_owner("b"))
        );
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::Forbidden as i32, 1003);
        assert_eq!(
            ErrorCode::from(&TinylinkerError::gone("x")) as i32,
            3001
        );
    }
}
