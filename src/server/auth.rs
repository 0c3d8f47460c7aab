//! Access tokens, password hashes and the bearer-token extractor.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. Accounts are configured up front
//! as `login:argon2-hash` pairs; there is no sign-up.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;
use super::models::User;
use super::state::AppState;
use crate::error::{CardNewsError, Result};

/// Identity used for every request when dev mode is on.
pub const DEV_USER_ID: &str = "dev-user";
pub const DEV_USER_EMAIL: &str = "dev@example.com";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_ttl_mins: i64,
}

pub fn generate_access_token(
    user: &User,
    config: &JwtConfig,
) -> std::result::Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: now + config.token_ttl_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the embedded claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> std::result::Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Configured accounts, login → password hash.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    hashes: HashMap<String, String>,
}

impl Accounts {
    /// Parse `login:hash` entries. PHC hashes never contain `:`.
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hashes = HashMap::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (login, hash) = entry
                .split_once(':')
                .filter(|(l, h)| !l.trim().is_empty() && !h.is_empty())
                .ok_or_else(|| CardNewsError::Config(format!("user '{}' is not login:hash", entry)))?;
            PasswordHash::new(hash)
                .map_err(|e| CardNewsError::Config(format!("user '{}': {}", login, e)))?;
            hashes.insert(login.trim().to_string(), hash.to_string());
        }
        Ok(Self { hashes })
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// The account for `login` if `password` matches its hash.
    pub fn authenticate(&self, login: &str, password: &str) -> Option<User> {
        let hash = self.hashes.get(login)?;
        match verify_password(password, hash) {
            Ok(true) => Some(User {
                id: login.to_string(),
                email: login_email(login),
            }),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(login, error = %e, "stored password hash unusable");
                None
            }
        }
    }
}

/// Logins without a domain get `@local` appended.
pub fn login_email(login: &str) -> String {
    if login.contains('@') {
        login.to_string()
    } else {
        format!("{}@local", login)
    }
}

/// Token from an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Caller identity for handlers that require a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn dev() -> Self {
        Self(User {
            id: DEV_USER_ID.to_string(),
            email: DEV_USER_EMAIL.to_string(),
        })
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> std::result::Result<Self, Self::Rejection> {
        if state.config.dev_mode {
            return Ok(Self::dev());
        }
        let token = bearer_token(&parts.headers).ok_or_else(|| ApiError::Unauthorized("Unauthorized - No token provided".into()))?;
        let claims = validate_token(token, &state.jwt)
            .map_err(|_| ApiError::Unauthorized("Unauthorized - Invalid token".into()))?;
        Ok(Self(User {
            id: claims.sub,
            email: claims.email,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            token_ttl_mins: 15,
        }
    }

    fn user() -> User {
        User {
            id: "admin@example.com".into(),
            email: "admin@example.com".into(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let token = generate_access_token(&user(), &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_access_token(&user(), &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".into(),
            token_ttl_mins: 15,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "a".into(),
            email: "a".into(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn test_accounts_authenticate() {
        let hash = hash_password("hunter22").unwrap();
        let accounts = Accounts::parse([format!("admin@example.com:{}", hash)]).unwrap();
        assert_eq!(accounts.authenticate("admin@example.com", "hunter22"), Some(user()));
        assert_eq!(accounts.authenticate("admin@example.com", "wrong"), None);
        assert_eq!(accounts.authenticate("nobody", "hunter22"), None);

        let accounts = Accounts::parse([format!("21t:{}", hash)]).unwrap();
        let user = accounts.authenticate("21t", "hunter22").unwrap();
        assert_eq!(user.email, "21t@local");
    }

    #[test]
    fn test_accounts_reject_malformed_entries() {
        assert!(Accounts::parse(["no-colon"]).is_err());
        assert!(Accounts::parse(["user:not-a-phc-hash"]).is_err());
        assert!(Accounts::parse([":$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"]).is_err());
    }
}
