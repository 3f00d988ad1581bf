use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::error::ApiError;
use crate::session::{Claims, SESSION_COOKIE};
use crate::state::AppState;

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()))
}

/// Verified claims of the current request, if any.
pub fn current_claims(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Option<Claims> {
    let token = session_token(headers, jar)?;
    state.keys().verify(&token).ok()
}

/// Middleware that requires a signed-in admin.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers(), &jar)
        .ok_or_else(|| ApiError::Unauthorized("sign in required".to_string()))?;
    let claims = state.keys().verify(&token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
