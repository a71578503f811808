//! JWT Token Generation and Validation
//!
//! HS256 with a shared secret. Tokens carry the user's identity and role
//! claims so requests can be authorized without a database round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::{AuthError, AuthResult};
use crate::config::Config;
use crate::db::User;
use crate::permissions::{Actor, Role};

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Username.
    pub name: String,
    pub email: String,
    /// Every role held by the user. Unknown names fail deserialization.
    pub roles: Vec<Role>,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Numeric user id from `sub`.
    pub fn user_id(&self) -> AuthResult<i64> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// Highest held role. A token without roles is invalid.
    pub fn role(&self) -> AuthResult<Role> {
        Role::highest(self.roles.iter().copied()).ok_or(AuthError::InvalidToken)
    }

    /// The acting identity these claims describe.
    pub fn actor(&self) -> AuthResult<Actor> {
        Ok(Actor::new(self.user_id()?, self.role()?))
    }
}

/// Sign a token for `user` holding `roles`.
///
/// An empty role set is issued as `[User]`.
pub fn generate_token(user: &User, roles: &[Role], config: &Config) -> AuthResult<String> {
    let now = Utc::now();
    let roles = if roles.is_empty() {
        vec![Role::User]
    } else {
        roles.to_vec()
    };

    let expires_at = Duration::try_seconds(config.jwt_expiry)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::Internal("token expiry out of range".into()))?;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        email: user.email.clone(),
        roles,
        iss: config.jwt_issuer.clone(),
        aud: config.jwt_audience.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

/// Validate signature, expiry, issuer and audience, then decode.
pub fn validate_token(token: &str, config: &Config) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_audience(&[&config.jwt_audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
