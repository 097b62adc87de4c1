//! Session issuance — the "complete sign-in" step of the OTP flow.
//!
//! Sign-in is an HS256 token set as the session cookie; the protected area
//! validates it on every request. The polling fallback signs users in
//! persistently, matching the original flow.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::cookie::{PERSISTENT_SESSION_TTL_SECS, SESSION_TTL_SECS};
use crate::error::AccountError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

pub fn issue_session_token(
    user_id: Uuid,
    secret: &str,
    persistent: bool,
) -> Result<(String, u64), AccountError> {
    let ttl = if persistent {
        PERSISTENT_SESSION_TTL_SECS
    } else {
        SESSION_TTL_SECS
    };
    let exp = now_secs() + ttl;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AccountError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Validate a session token and return the signed-in user's id.
pub fn validate_session_token(token: &str, secret: &str) -> Result<Uuid, AccountError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AccountError::AuthenticationFailed)?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| AccountError::AuthenticationFailed)
}
