//! Admin sessions.
//!
//! Login checks the password against the configured Argon2id hash and issues a
//! signed session token in an httpOnly cookie. Machine callers (cron) present
//! the shared secret instead.

use axum::http::{header, HeaderMap};
use shared::jwt::{JwtError, SessionSigner};
use shared::password::{verify_password, PasswordError};

use crate::config::AdminConfig;

/// Header carrying the shared admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// How an admin request was authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPrincipal {
    Session { jti: String },
    SharedSecret,
}

#[derive(Clone)]
pub struct AdminSessions {
    signer: SessionSigner,
    password_hash: String,
    shared_secret: String,
    cookie_name: String,
    cookie_secure: bool,
}

impl std::fmt::Debug for AdminSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessions")
            .field("cookie_name", &self.cookie_name)
            .field("password_login", &!self.password_hash.is_empty())
            .field("shared_secret", &!self.shared_secret.is_empty())
            .finish()
    }
}

impl AdminSessions {
    pub fn new(config: &AdminConfig) -> Result<Self, JwtError> {
        Ok(Self {
            signer: SessionSigner::new(
                &config.session_secret,
                config.session_ttl_secs,
                config.session_leeway_secs,
            )?,
            password_hash: config.password_hash.clone(),
            shared_secret: config.shared_secret.clone(),
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
        })
    }

    pub fn password_login_enabled(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Checks the admin password. Argon2 is deliberately slow; call from a blocking task.
    pub fn check_password(&self, password: &str) -> Result<bool, PasswordError> {
        if !self.password_login_enabled() {
            return Ok(false);
        }
        verify_password(password, &self.password_hash)
    }

    /// Issues a session token.
    pub fn issue(&self) -> Result<String, JwtError> {
        self.signer.issue().map(|(token, _jti)| token)
    }

    /// Session cookie or shared secret, in that order.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<AdminPrincipal> {
        if let Some(token) = extract_cookie(headers, &self.cookie_name) {
            match self.signer.validate(token) {
                Ok(claims) => return Some(AdminPrincipal::Session { jti: claims.jti }),
                Err(e) => tracing::debug!(error = %e, "Rejected admin session cookie"),
            }
        }

        let presented = headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .or_else(|| bearer_token(headers))?;

        if shared::crypto::secrets_match(&self.shared_secret, presented) {
            Some(AdminPrincipal::SharedSecret)
        } else {
            None
        }
    }

    /// `Set-Cookie` value for a fresh session.
    pub fn session_cookie(&self, token: &str) -> String {
        self.build_cookie(token, self.signer.ttl_secs)
    }

    /// `Set-Cookie` value that removes the session.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = self.build_cookie("", 0);
        cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        cookie
    }

    fn build_cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.cookie_name, value, max_age
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Value of cookie `name` from the `Cookie` headers.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}
