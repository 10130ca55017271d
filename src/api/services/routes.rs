//! 路由配置
//!
//! The binary and the integration tests both mount [`configure`], so they
//! always see the same routing table.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use super::auth::{index, login, login_form, logout, register, register_form};
use super::error_code::ErrorCode;
use super::health::health_check;
use super::helpers::error_response;
use super::redirect::handle_redirect;
use super::urls::{
    create_url, delete_url, dump_urls, get_url, list_urls, new_url_form, update_url,
};

/// 链接管理路由 `/urls`
///
/// 包含：
/// - GET /urls - 当前用户的链接
/// - POST /urls - 创建链接
/// - GET /urls/new - 创建表单
/// - GET /urls/{code} - 单个链接
/// - POST /urls/{code} - 更新链接
/// - POST /urls/{code}/delete - 删除链接
pub fn urls_routes() -> actix_web::Scope {
    web::scope("/urls")
        .route("", web::get().to(list_urls))
        .route("", web::post().to(create_url))
        // must be before /{code}
        .route("/new", web::get().to(new_url_form))
        .route("/{code}", web::get().to(get_url))
        .route("/{code}", web::post().to(update_url))
        .route("/{code}/delete", web::post().to(delete_url))
}

/// 认证路由
pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/login")
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .service(
        web::resource("/register")
            .route(web::get().to(register_form))
            .route(web::post().to(register)),
    )
    .route("/logout", web::post().to(logout));
}

async fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not Found")
}

/// Mounts every route. Expects `AccessController`, `SessionIdentity` and
/// `UserStore` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        // before the /urls scope
        .route("/urls.json", web::get().to(dump_urls))
        .service(urls_routes())
        .route("/u/{code}", web::get().to(handle_redirect))
        .configure(auth_routes)
        .default_service(web::to(not_found));
}
