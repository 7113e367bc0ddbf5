//! Admin authentication: password check, HS256 session tokens, and the
//! [`AdminSession`] extractor.
//!
//! There is a single admin identity. Logging in with the admin password
//! yields a 24-hour JWT, delivered as the `auth-token` HttpOnly cookie and
//! also accepted as `Authorization: Bearer <token>`.

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth-token";

/// The only role ever issued.
pub const ADMIN_ROLE: &str = "admin";

/// Session lifetime, also used as the cookie `Max-Age`.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub role: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// How the admin password is held.
#[derive(Clone)]
pub enum AdminPassword {
    /// Compared as-is.
    Plain(String),
    /// Argon2 PHC string.
    Hash(String),
}

impl AdminPassword {
    /// Accept `phc` only if it parses as a PHC hash string.
    pub fn hash(phc: impl Into<String>) -> Result<Self, String> {
        let phc = phc.into();
        PasswordHash::new(&phc).map_err(|e| e.to_string())?;
        Ok(Self::Hash(phc))
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            AdminPassword::Plain(expected) => expected == candidate,
            AdminPassword::Hash(phc) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok(),
                Err(e) => {
                    tracing::error!(error = %e, "Stored admin password hash is unreadable");
                    false
                }
            },
        }
    }
}

impl std::fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminPassword::Plain(_) => f.write_str("Plain(<redacted>)"),
            AdminPassword::Hash(_) => f.write_str("Hash(<redacted>)"),
        }
    }
}

/// Token signing secret plus the admin password.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    password: AdminPassword,
    token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("password", &self.password)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, password: AdminPassword) -> Self {
        Self {
            secret: secret.into(),
            password,
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }

    /// Issue a fresh admin token.
    pub fn create_token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            role: ADMIN_ROLE.to_string(),
            iat: now,
            exp: now + self.token_ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(), // HS256
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// `true` if the request carries a valid admin token.
    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        token_from_headers(headers)
            .map(|t| self.verify_token(&t).is_ok())
            .unwrap_or(false)
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

/// Bearer token first, then the `auth-token` cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}

/// `Set-Cookie` value carrying a new session token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{AUTH_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Proof that the request was made by the admin.
///
/// Add as a handler parameter to protect a route. Rejects with 401
/// `No token provided` or `Invalid token`.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".into()))?;

        let claims = state.auth.verify_token(&token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected admin token");
            ApiError::Unauthorized("Invalid token".into())
        })?;

        Ok(AdminSession { claims })
    }
}
