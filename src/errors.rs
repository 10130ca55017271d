use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TinylinkerError {
    InvalidInput(String),
    NotAuthenticated(String),
    NotOwner(String),
    NotFound(String),
    Gone(String),
    AlreadyExists(String),
    InvalidCredentials(String),
    PersistenceDegraded(String),
    Internal(String),
    Config(String),
}

impl TinylinkerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TinylinkerError::InvalidInput(_) => "E001",
            TinylinkerError::NotAuthenticated(_) => "E002",
            TinylinkerError::NotOwner(_) => "E003",
            TinylinkerError::NotFound(_) => "E004",
            TinylinkerError::Gone(_) => "E005",
            TinylinkerError::AlreadyExists(_) => "E006",
            TinylinkerError::InvalidCredentials(_) => "E007",
            TinylinkerError::PersistenceDegraded(_) => "E008",
            TinylinkerError::Internal(_) => "E009",
            TinylinkerError::Config(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TinylinkerError::InvalidInput(_) => "Invalid Input",
            TinylinkerError::NotAuthenticated(_) => "Not Authenticated",
            TinylinkerError::NotOwner(_) => "Not Owner",
            TinylinkerError::NotFound(_) => "Resource Not Found",
            TinylinkerError::Gone(_) => "Resource Gone",
            TinylinkerError::AlreadyExists(_) => "Already Exists",
            TinylinkerError::InvalidCredentials(_) => "Invalid Credentials",
            TinylinkerError::PersistenceDegraded(_) => "Persistence Degraded",
            TinylinkerError::Internal(_) => "Internal Error",
            TinylinkerError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TinylinkerError::InvalidInput(msg)
            | TinylinkerError::NotAuthenticated(msg)
            | TinylinkerError::NotOwner(msg)
            | TinylinkerError::NotFound(msg)
            | TinylinkerError::Gone(msg)
            | TinylinkerError::AlreadyExists(msg)
            | TinylinkerError::InvalidCredentials(msg)
            | TinylinkerError::PersistenceDegraded(msg)
            | TinylinkerError::Internal(msg)
            | TinylinkerError::Config(msg) => msg,
        }
    }

    /// HTTP status the error maps to when it reaches a handler.
    ///
    /// `PersistenceDegraded` never reaches a caller in practice; it is only logged.
    pub fn http_status(&self) -> StatusCode {
        match self {
            TinylinkerError::InvalidInput(_) | TinylinkerError::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            TinylinkerError::NotAuthenticated(_)
            | TinylinkerError::NotOwner(_)
            | TinylinkerError::InvalidCredentials(_) => StatusCode::FORBIDDEN,
            TinylinkerError::NotFound(_) => StatusCode::NOT_FOUND,
            TinylinkerError::Gone(_) => StatusCode::GONE,
            TinylinkerError::PersistenceDegraded(_)
            | TinylinkerError::Internal(_)
            | TinylinkerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TinylinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TinylinkerError {}

// 便捷的构造函数
impl TinylinkerError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::InvalidInput(msg.into())
    }

    pub fn not_authenticated<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::NotAuthenticated(msg.into())
    }

    pub fn not_owner<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::NotOwner(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::NotFound(msg.into())
    }

    pub fn gone<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::Gone(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::AlreadyExists(msg.into())
    }

    pub fn invalid_credentials<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::InvalidCredentials(msg.into())
    }

    pub fn persistence_degraded<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::PersistenceDegraded(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::Internal(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        TinylinkerError::Config(msg.into())
    }
}

impl From<std::io::Error> for TinylinkerError {
    fn from(err: std::io::Error) -> Self {
        TinylinkerError::PersistenceDegraded(err.to_string())
    }
}

impl From<serde_json::Error> for TinylinkerError {
    fn from(err: serde_json::Error) -> Self {
        TinylinkerError::PersistenceDegraded(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for TinylinkerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        TinylinkerError::Internal(format!("session token error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TinylinkerError>;
