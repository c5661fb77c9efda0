use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "tripnest_session";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Sign a session token for `user_id`.
pub fn issue_token(auth: &AuthConfig, user_id: Uuid) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        role: "GUEST".to_owned(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token encoding failed: {}", e)))
}

// ============================================================================
// Session extractor
// ============================================================================

/// The caller's session. Read from `Authorization: Bearer` first, then
/// from the session cookie; a missing or invalid token is a 401.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // 1. Find a token
        let bearer = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());
        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or_else(AppError::unauthenticated)?,
        };

        // 2. Verify signature and expiry
        let data = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(state.auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::unauthenticated()
        })?;

        // 3. Subject must be a user id
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::unauthenticated())?;
        Ok(SessionUser { user_id })
    }
}
