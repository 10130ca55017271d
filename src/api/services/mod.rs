pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod redirect;
pub mod routes;
pub mod types;
pub mod urls;

pub use error_code::ErrorCode;
pub use routes::configure;
pub use types::{ApiResponse, HealthResponse, UrlDetail, UrlListResponse};
