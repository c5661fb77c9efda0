use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{issue_token, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    token: String,
    user_id: Uuid,
    expires_in: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/guest", post(login_guest))
        .route("/logout", post(logout))
}

/// POST /api/auth/guest
/// Start an anonymous session; the token comes back in the body and as a cookie.
async fn login_guest(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let user_id = Uuid::new_v4();
    let token = issue_token(&state.auth, user_id)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("Guest session started for {}", user_id);
    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            token,
            user_id,
            expires_in: state.auth.expiration,
        }),
    ))
}

/// POST /api/auth/logout
async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(json!({ "message": "Logged out" })),
    )
}
