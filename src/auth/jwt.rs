//! HS256 session tokens.
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, Session};
use crate::model::{Profile, Role};

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtAuthority {
    secret: String,
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthority")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtAuthority {
    /// Fails when the secret is shorter than [`MIN_SECRET_LEN`] characters.
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AuthError::Config("jwt secret is required".into()));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "jwt secret must be at least {MIN_SECRET_LEN} characters"
            )));
        }
        Ok(Self { secret, ttl_secs })
    }

    pub fn issue_session(&self, profile: &Profile) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: profile.id,
            role: profile.role,
            iat: now,
            exp: now.saturating_add(self.ttl_secs as i64),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Token(format!("failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            let msg = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "invalid signature",
                ErrorKind::InvalidToken => "invalid token",
                _ => "token validation failed",
            };
            AuthError::InvalidToken(msg.to_string())
        })?;

        Ok(Session {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}
