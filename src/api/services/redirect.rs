use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, HeaderValue, LOCATION};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, trace};

use crate::errors::TinylinkerError;
use crate::services::AccessController;
use crate::utils::is_valid_short_code;

use super::helpers::error_from_tinylinker;

/// GET /u/{code} - 公开跳转，无需登录
pub async fn handle_redirect(
    path: web::Path<String>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let code = path.into_inner();

    if !is_valid_short_code(&code) {
        // 非法短码，直接 404，不查注册表
        trace!("Invalid short code rejected: {}", code);
        return error_from_tinylinker(&TinylinkerError::not_found("Short code not found"));
    }

    match access.resolve_redirect(&code) {
        Ok(long_url) => {
            // records written before targets were normalized may not fit a header
            let Ok(location) = HeaderValue::from_str(&long_url) else {
                error!("Stored target for '{}' is not a valid Location value", code);
                return error_from_tinylinker(&TinylinkerError::internal(
                    "Stored redirect target is unusable",
                ));
            };
            debug!("Redirecting '{}' to {}", code, long_url);
            HttpResponse::build(StatusCode::MOVED_PERMANENTLY)
                .insert_header((LOCATION, location))
                // the target can still be edited or deleted
                .insert_header((CACHE_CONTROL, "no-cache"))
                .finish()
        }
        Err(e) => error_from_tinylinker(&e),
    }
}
