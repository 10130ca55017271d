//! 登录、注册、登出端点

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{error, info};

use crate::errors::TinylinkerError;
use crate::services::{SessionIdentity, UserStore};
use crate::storage::UserId;

use super::error_code::ErrorCode;
use super::helpers::{error_from_tinylinker, error_response, found, html_page, run_blocking};
use super::types::CredentialsForm;

const CREDENTIAL_FIELDS: &str = "<label>Email <input type=\"email\" name=\"email\"></label>\n\
     <label>Password <input type=\"password\" name=\"password\"></label>";

/// Sets the session cookie for `user_id` and sends the browser to `/urls`.
fn start_session(sessions: &SessionIdentity, user_id: &UserId) -> HttpResponse {
    match sessions.bind(user_id) {
        Ok(cookie) => found("/urls").cookie(cookie).finish(),
        Err(e) => {
            error!("Failed to bind session for '{}': {}", user_id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to start session",
            )
        }
    }
}

/// GET / - 按登录状态跳转
pub async fn index(req: HttpRequest, sessions: web::Data<SessionIdentity>) -> HttpResponse {
    match sessions.resolve_request(&req) {
        Some(_) => found("/urls").finish(),
        None => found("/login").finish(),
    }
}

/// GET /login
pub async fn login_form(req: HttpRequest, sessions: web::Data<SessionIdentity>) -> HttpResponse {
    if sessions.resolve_request(&req).is_some() {
        return found("/urls").finish();
    }

    html_page(
        "Login",
        &format!(
            "<form method=\"POST\" action=\"/login\">\n{CREDENTIAL_FIELDS}\n<button type=\"submit\">Login</button>\n</form>\n<p><a href=\"/register\">Register</a></p>"
        ),
    )
}

/// POST /login - 校验凭据并建立会话
pub async fn login(
    form: web::Form<CredentialsForm>,
    users: web::Data<UserStore>,
    sessions: web::Data<SessionIdentity>,
) -> HttpResponse {
    let CredentialsForm { email, password } = form.into_inner();

    match run_blocking(move || users.authenticate(&email, &password)).await {
        Ok(user_id) => {
            info!("Login successful for '{}'", user_id);
            start_session(&sessions, &user_id)
        }
        Err(e) => {
            info!("Login failed");
            error_from_tinylinker(&e)
        }
    }
}

/// POST /logout - 清除会话 cookie
pub async fn logout(sessions: web::Data<SessionIdentity>) -> HttpResponse {
    info!("Logout");
    found("/login").cookie(sessions.clear()).finish()
}

/// GET /register
pub async fn register_form(
    req: HttpRequest,
    sessions: web::Data<SessionIdentity>,
) -> HttpResponse {
    if sessions.resolve_request(&req).is_some() {
        return found("/urls").finish();
    }

    html_page(
        "Register",
        &format!(
            "<form method=\"POST\" action=\"/register\">\n{CREDENTIAL_FIELDS}\n<button type=\"submit\">Register</button>\n</form>\n<p><a href=\"/login\">Login</a></p>"
        ),
    )
}

/// POST /register - 创建账户并直接登录
pub async fn register(
    form: web::Form<CredentialsForm>,
    users: web::Data<UserStore>,
    sessions: web::Data<SessionIdentity>,
) -> HttpResponse {
    let CredentialsForm { email, password } = form.into_inner();

    match run_blocking(move || users.register(&email, &password)).await {
        Ok(user_id) => start_session(&sessions, &user_id),
        Err(e @ (TinylinkerError::InvalidInput(_) | TinylinkerError::AlreadyExists(_))) => {
            info!("Registration rejected: {}", e.message());
            error_from_tinylinker(&e)
        }
        Err(e) => error_from_tinylinker(&e),
    }
}
