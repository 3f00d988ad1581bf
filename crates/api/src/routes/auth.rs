//! Admin sign-in and sign-out.
use axum::{extract::State, http::HeaderMap, routing::{get, post}, Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult, LOGIN_ROUTE};
use crate::middleware::auth::current_claims;
use crate::session::{expired_session_cookie, session_cookie};
use crate::state::AppState;

const DASHBOARD_ROUTE: &str = "/admin";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/login", post(login))
        .route("/v1/admin/logout", post(logout))
        .route("/v1/admin/session", get(session))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }
    let user = state.auth().sign_in(request.email.trim(), &request.password).await?;
    let token = state.keys().issue(&user)?;
    tracing::info!(email = %user.email, "admin signed in");

    let body = json!({
        "token": token,
        "user": { "id": user.id, "email": user.email },
        "redirect": DASHBOARD_ROUTE,
    });
    let cookie = session_cookie(token, state.config().secure_cookies);
    Ok((jar.add(cookie), Json(body)))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    if let Some(claims) = current_claims(&state, &headers, &jar) {
        if let Some(token) = claims.provider_token.as_deref() {
            if let Err(err) = state.auth().sign_out(token).await {
                tracing::warn!(email = %claims.email, "remote sign-out failed: {err}");
            }
        }
        tracing::info!(email = %claims.email, "admin signed out");
    }
    (
        jar.remove(expired_session_cookie()),
        Json(json!({ "redirect": LOGIN_ROUTE })),
    )
}

async fn session(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Json<Value> {
    match current_claims(&state, &headers, &jar) {
        Some(claims) => Json(json!({
            "authenticated": true,
            "user": { "id": claims.sub, "email": claims.email },
        })),
        None => Json(json!({ "authenticated": false, "redirect": LOGIN_ROUTE })),
    }
}
