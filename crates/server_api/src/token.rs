use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::domain::{Role, UserId};

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub
            .strip_prefix("user:")
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(UserId)
    }
}

pub fn mint_session_token(
    cfg: &TokenConfig,
    user_id: UserId,
    role: Role,
) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(cfg.ttl_seconds);
    let claims = SessionClaims {
        iss: cfg.issuer.clone(),
        sub: format!("user:{}", user_id.0),
        role,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

pub fn verify_session_token(
    cfg: &TokenConfig,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[cfg.issuer.as_str()]);
    let decoded = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )?;
    Ok(decoded.claims)
}

#[cfg(test)]
#[path = "tests/token_tests.rs"]
mod tests;
