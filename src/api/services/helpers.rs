//! Response builders shared by the handlers

use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::{HttpResponse, HttpResponseBuilder, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::api::constants::FORBIDDEN_MESSAGE;
use crate::errors::{Result, TinylinkerError};

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// Maps a domain error to its HTTP status and JSON body.
///
/// Both 403 variants get the same fixed message.
pub fn error_from_tinylinker(err: &TinylinkerError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {} ({})", err, err.code());
    } else {
        debug!("Request rejected: {} ({})", err, err.code());
    }

    let message = match err {
        TinylinkerError::NotAuthenticated(_) | TinylinkerError::NotOwner(_) => FORBIDDEN_MESSAGE,
        _ => err.message(),
    };
    error_response(status, ErrorCode::from(err), message)
}

/// Runs a service call that touches the snapshot files or the password hasher
/// on the blocking thread pool.
pub async fn run_blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| TinylinkerError::internal(format!("Blocking task failed: {}", e)))?
}

/// 302 to `location`
pub fn found(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((LOCATION, location.to_string()));
    builder
}

/// Minimal HTML page around `body`
pub fn html_page(title: &str, body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/html; charset=utf-8"))
        .body(format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} - tinylinker</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_forbidden_bodies_are_identical() {
        let a = error_from_tinylinker(&TinylinkerError::not_authenticated("login required"));
        let b = error_from_tinylinker(&TinylinkerError::not_owner("abc123 belongs to alice"));
        assert_eq!(a.status(), StatusCode::FORBIDDEN);
        assert_eq!(b.status(), StatusCode::FORBIDDEN);

        let a = to_bytes(a.into_body()).await.unwrap();
        let b = to_bytes(b.into_body()).await.unwrap();
        assert_eq!(a, b);
        assert!(!String::from_utf8_lossy(&b).contains("abc123"));
    }

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let resp = error_from_tinylinker(&TinylinkerError::gone("deleted"));
        assert_eq!(resp.status(), StatusCode::GONE);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], 3001);
        assert_eq!(value["message"], "deleted");
        assert!(value.get("data").is_none());
    }

    #[actix_rt::test]
    async fn test_run_blocking_passes_results_through() {
        assert_eq!(run_blocking(|| Ok(7)).await.unwrap(), 7);

        let err = run_blocking::<_, ()>(|| Err(TinylinkerError::not_found("abc123")))
            .await
            .unwrap_err();
        assert!(matches!(err, TinylinkerError::NotFound(_)));
    }

    #[test]
    fn test_found_sets_location() {
        let resp = found("/urls").finish();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/urls");
    }
}
