use crate::backend::{BackendError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Sessions live as long as the hosted service's default (one year).
pub const SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (account ID)
    pub sid: String, // Session ID
    pub email: String,
    pub exp: usize,
}

pub fn create_token(
    account_id: &str,
    session_id: &str,
    email: &str,
    secret: &str,
) -> Result<(String, DateTime<Utc>)> {
    let expires_at = Utc::now()
        .checked_add_signed(Duration::days(SESSION_TTL_DAYS))
        .ok_or_else(|| BackendError::Internal("Failed to calculate expiration".into()))?;

    let claims = Claims {
        sub: account_id.to_string(),
        sid: session_id.to_string(),
        email: email.to_string(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BackendError::Internal(format!("Token Creation failed: {}", e)))?;

    Ok((token, expires_at))
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| BackendError::Unauthorized(format!("Invalid session: {e}")))
}
