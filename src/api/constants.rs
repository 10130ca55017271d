//! API 模块常量定义

/// `token_type` claim carried by session tokens
pub const SESSION_TOKEN_TYPE: &str = "session";

/// Form field carrying the target URL
pub const LONG_URL_FIELD: &str = "longURL";

/// Body of every 403 from an owner-scoped route. Identical for "not logged in"
/// and "not yours" so it never reveals whether a code exists.
pub const FORBIDDEN_MESSAGE: &str = "You do not have access to this resource";
