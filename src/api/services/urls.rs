//! `/urls` 相关端点：列表、创建、查看、更新、删除

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;

use crate::api::constants::LONG_URL_FIELD;
use crate::services::{AccessController, SessionIdentity};

use super::helpers::{error_from_tinylinker, found, html_page, run_blocking, success_response};
use super::types::{UrlDetail, UrlForm, UrlListResponse};

/// GET /urls - 当前用户的链接
pub async fn list_urls(
    req: HttpRequest,
    sessions: web::Data<SessionIdentity>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let caller = sessions.resolve_request(&req);

    match access.list(caller.as_deref()) {
        Ok(records) => {
            let mut urls: Vec<UrlDetail> = records
                .into_iter()
                .map(|(code, record)| UrlDetail::new(code, record))
                .collect();
            urls.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.short_code.cmp(&b.short_code))
            });
            success_response(UrlListResponse {
                total: urls.len(),
                urls,
            })
        }
        Err(e) => error_from_tinylinker(&e),
    }
}

/// GET /urls/new - 创建表单，未登录跳转 /login
pub async fn new_url_form(req: HttpRequest, sessions: web::Data<SessionIdentity>) -> HttpResponse {
    if sessions.resolve_request(&req).is_none() {
        return found("/login").finish();
    }

    html_page(
        "Create TinyURL",
        &format!(
            "<form method=\"POST\" action=\"/urls\">\n\
             <label>Enter a URL: <input type=\"text\" name=\"{LONG_URL_FIELD}\" placeholder=\"http://\"></label>\n\
             <button type=\"submit\">Submit</button>\n\
             </form>"
        ),
    )
}

/// POST /urls - 创建短链接
pub async fn create_url(
    req: HttpRequest,
    form: web::Form<UrlForm>,
    sessions: web::Data<SessionIdentity>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let caller = sessions.resolve_request(&req);
    let long_url = form.into_inner().long_url;

    match run_blocking(move || access.create(caller.as_deref(), &long_url)).await {
        Ok(code) => {
            info!("Created short code '{}'", code);
            found(&format!("/urls/{}", code)).finish()
        }
        Err(e) => error_from_tinylinker(&e),
    }
}

/// GET /urls/{code} - 单个链接详情
pub async fn get_url(
    req: HttpRequest,
    path: web::Path<String>,
    sessions: web::Data<SessionIdentity>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let code = path.into_inner();
    let caller = sessions.resolve_request(&req);

    match access.view(caller.as_deref(), &code) {
        Ok(record) => success_response(UrlDetail::new(code, record)),
        Err(e) => error_from_tinylinker(&e),
    }
}

/// POST /urls/{code} - 更新目标地址
pub async fn update_url(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<UrlForm>,
    sessions: web::Data<SessionIdentity>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let code = path.into_inner();
    let caller = sessions.resolve_request(&req);
    let long_url = form.into_inner().long_url;

    let target = code.clone();
    match run_blocking(move || access.update(caller.as_deref(), &target, &long_url)).await {
        Ok(()) => found(&format!("/urls/{}", code)).finish(),
        Err(e) => error_from_tinylinker(&e),
    }
}

/// POST /urls/{code}/delete - 删除（墓碑）
pub async fn delete_url(
    req: HttpRequest,
    path: web::Path<String>,
    sessions: web::Data<SessionIdentity>,
    access: web::Data<AccessController>,
) -> HttpResponse {
    let code = path.into_inner();
    let caller = sessions.resolve_request(&req);

    match run_blocking(move || access.delete(caller.as_deref(), &code)).await {
        Ok(()) => found("/urls").finish(),
        Err(e) => error_from_tinylinker(&e),
    }
}

/// GET /urls.json - 完整注册表导出（含已删除记录）
pub async fn dump_urls(access: web::Data<AccessController>) -> HttpResponse {
    HttpResponse::Ok().json(access.registry().snapshot())
}
