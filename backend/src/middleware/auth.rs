use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    repositories::users,
    state::AppState,
    utils::{
        cookies::{extract_cookie_value, SESSION_COOKIE_NAME},
        jwt,
    },
};

const NOT_AUTHORIZED: &str = "Not authorized, please login";

/// Requires a valid session and loads the account it belongs to. The loaded
/// [`crate::models::user::User`] is inserted into the request extensions for
/// downstream handlers.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let claims = jwt::verify_session_token(&token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let user = users::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Pulls the session token from the request: Authorization bearer header
/// first, session cookie as the fallback.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = parse_bearer_token(value) {
            return Some(token.to_string());
        }
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}
