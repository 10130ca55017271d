//! Session identity
//!
//! Maps the session cookie to a known user id. How the id is carried in the
//! cookie is up to the [`SessionTransport`]; [`SessionIdentity`] only trusts
//! what the transport hands back and then checks it against the user store.

use std::sync::Arc;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use tracing::{debug, warn};

use crate::api::jwt::SessionTokenService;
use crate::config::{SameSitePolicy, SessionConfig, SessionMode};
use crate::errors::Result;
use crate::storage::UserId;
use crate::utils::generate_random_code;

use super::UserStore;

/// Encodes a user id into a cookie value and back.
pub trait SessionTransport: Send + Sync {
    fn encode(&self, user_id: &str) -> Result<String>;

    /// Returns the id only if the value passes the transport's checks.
    fn decode(&self, value: &str) -> Option<UserId>;

    fn name(&self) -> &'static str;
}

/// Cookie value is the bare user id. Anyone can forge it.
pub struct PlainCookieTransport;

impl SessionTransport for PlainCookieTransport {
    fn encode(&self, user_id: &str) -> Result<String> {
        Ok(user_id.to_string())
    }

    fn decode(&self, value: &str) -> Option<UserId> {
        Some(value.to_string()).filter(|v| !v.is_empty())
    }

    fn name(&self) -> &'static str {
        "plain"
    }
}

/// Cookie value is an HS256 session token.
pub struct SignedCookieTransport {
    tokens: SessionTokenService,
}

impl SignedCookieTransport {
    pub fn new(tokens: SessionTokenService) -> Self {
        Self { tokens }
    }
}

impl SessionTransport for SignedCookieTransport {
    fn encode(&self, user_id: &str) -> Result<String> {
        self.tokens.issue(user_id)
    }

    fn decode(&self, value: &str) -> Option<UserId> {
        match self.tokens.validate(value) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                debug!("Session token rejected: {}", e);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "signed"
    }
}

pub struct SessionIdentity {
    transport: Box<dyn SessionTransport>,
    users: Arc<UserStore>,
    cookie_name: String,
    cookie_secure: bool,
    same_site: SameSite,
    max_age: Duration,
}

impl SessionIdentity {
    pub fn new(
        transport: Box<dyn SessionTransport>,
        users: Arc<UserStore>,
        config: &SessionConfig,
    ) -> Self {
        let same_site = match config.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
            SameSitePolicy::Lax => SameSite::Lax,
        };

        Self {
            transport,
            users,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            same_site,
            max_age: Duration::hours(config.effective_max_age_hours() as i64),
        }
    }

    /// Picks the transport named by `session.mode`.
    ///
    /// An empty secret in signed mode gets a random per-process one, which
    /// invalidates every session on restart.
    pub fn from_config(config: &SessionConfig, users: Arc<UserStore>) -> Self {
        let transport: Box<dyn SessionTransport> = match config.mode {
            SessionMode::Plain => {
                warn!("Session mode 'plain': cookies carry bare user ids and can be forged");
                Box::new(PlainCookieTransport)
            }
            SessionMode::Signed => {
                let secret = if config.secret.is_empty() {
                    warn!("Session secret not configured, generating a random one");
                    generate_random_code(48)
                } else {
                    config.secret.clone()
                };
                Box::new(SignedCookieTransport::new(SessionTokenService::new(
                    &secret,
                    config.effective_max_age_hours(),
                )))
            }
        };

        Self::new(transport, users, config)
    }

    pub fn mode(&self) -> &'static str {
        self.transport.name()
    }

    /// Turns a cookie value into a user id known to the user store.
    pub fn resolve(&self, credential: Option<&str>) -> Option<UserId> {
        let user_id = self.transport.decode(credential?)?;
        if self.users.contains(&user_id) {
            Some(user_id)
        } else {
            debug!("Session names unknown user '{}'", user_id);
            None
        }
    }

    pub fn resolve_request(&self, req: &HttpRequest) -> Option<UserId> {
        let cookie = req.cookie(&self.cookie_name)?;
        self.resolve(Some(cookie.value()))
    }

    fn build_cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.cookie_name.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie_secure);
        cookie.set_same_site(self.same_site);
        cookie.set_max_age(max_age);
        cookie
    }

    /// Cookie that establishes a session for `user_id`.
    pub fn bind(&self, user_id: &str) -> Result<Cookie<'static>> {
        let value = self.transport.encode(user_id)?;
        Ok(self.build_cookie(value, self.max_age))
    }

    /// Expired cookie that ends the session on the client.
    pub fn clear(&self) -> Cookie<'static> {
        self.build_cookie(String::new(), Duration::ZERO)
    }
}
