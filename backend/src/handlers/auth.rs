//! Handlers for registration, login, sessions, and the password reset flow.

use std::time::Duration;

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{
        AuthResponse, ChangePasswordPayload, ForgotPasswordPayload, LoginPayload, RegisterPayload,
        ResetPasswordPayload, User, UserResponse,
    },
    repositories::{password_resets, users},
    state::AppState,
    utils::{
        cookies,
        jwt,
        password::{hash_password, verify_password},
        security,
    },
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    // Friendly pre-check; the unique index still decides under concurrency.
    if users::find_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "email",
            "Email has already been registered",
        ));
    }

    let password_hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    let user = User::new(payload.name, payload.email, password_hash);
    users::insert(&state.pool, &user).await?;

    tracing::info!(user_id = %user.id, "Registered new user");

    let (token, cookie) = issue_session(&user, &state)?;
    let body = AuthResponse {
        token,
        user: UserResponse::from(user),
    };

    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let user = users::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

    ensure_password_matches(&payload.password, &user.password_hash, "Invalid email or password")?;

    let (token, cookie) = issue_session(&user, &state)?;
    tracing::info!(user_id = %user.id, "User logged in");

    let body = AuthResponse {
        token,
        user: UserResponse::from(user),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Stateless logout: overwrites the session cookie with an expired one.
/// Public so that a client with a dead session can still clear it.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = cookies::clear_session_cookie(state.config.cookie_options());
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Successfully logged out" })),
    )
        .into_response()
}

/// Reports whether the caller currently holds a valid session, without ever
/// failing the request.
pub async fn login_status(State(state): State<AppState>, headers: HeaderMap) -> Json<bool> {
    Json(session_user_id(&headers, &state.config.jwt_secret).is_some())
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    ensure_password_matches(
        &payload.old_password,
        &user.password_hash,
        "Current password is incorrect",
    )?;

    let password_hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    users::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// Always answers with the same acceptance message. Whether the email maps to
/// an account is not observable from the response, so the endpoint cannot be
/// used to probe for registered addresses.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let accepted = Json(json!({ "message": "Password reset email sent" }));

    let Some(user) = users::find_by_email(&state.pool, &payload.email).await? else {
        tracing::debug!("Password reset requested for an unknown email");
        return Ok(accepted);
    };

    let secret = security::generate_token(security::RESET_SECRET_BYTES);
    let raw_value = security::build_reset_value(&secret, user.id);
    password_resets::create_reset_token(
        &state.pool,
        user.id,
        &raw_value,
        state.config.reset_token_ttl_minutes,
    )
    .await?;

    let reset_url = format!("{}/resetpassword/{}", state.config.frontend_url, raw_value);
    // SMTP delivery is blocking I/O, so it runs off the async workers.
    let mailer = state.mailer.clone();
    let to_email = user.email.clone();
    let name = user.name.clone();
    let ttl_minutes = state.config.reset_token_ttl_minutes;
    tokio::task::spawn_blocking(move || {
        mailer.send_reset_email(&to_email, &name, &reset_url, ttl_minutes)
    })
    .await
    .map_err(|err| AppError::Internal(err.into()))?
    .map_err(AppError::Dependency)?;

    tracing::info!(user_id = %user.id, "Password reset email sent");

    Ok(accepted)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    let redeemed =
        password_resets::redeem_reset_token(&state.pool, &token, &password_hash, Utc::now())
            .await?;

    let Some(user_id) = redeemed else {
        return Err(AppError::Auth("Invalid or expired reset token".to_string()));
    };

    tracing::info!(user_id = %user_id, "Password reset completed");

    Ok(Json(json!({ "message": "Password reset successful, please login" })))
}

/// Resolves the user id behind a request's session credentials, if any.
pub fn session_user_id(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let token = cookies::extract_cookie_value(cookie_header, cookies::SESSION_COOKIE_NAME)?;
    let claims = jwt::verify_session_token(&token, secret).ok()?;
    Some(claims.sub)
}

/// Verifies a candidate password, mapping a mismatch to the given low-detail
/// message so the response does not reveal which credential was wrong.
pub fn ensure_password_matches(
    candidate: &str,
    password_hash: &str,
    message: &str,
) -> Result<(), AppError> {
    let matches = verify_password(candidate, password_hash).map_err(AppError::Internal)?;
    if matches {
        Ok(())
    } else {
        Err(AppError::Auth(message.to_string()))
    }
}

fn issue_session(user: &User, state: &AppState) -> Result<(String, String), AppError> {
    let token = jwt::create_session_token(
        user.id,
        &state.config.jwt_secret,
        state.config.session_ttl_hours,
    )
    .map_err(AppError::Internal)?;
    let cookie = cookies::session_cookie(
        &token,
        Duration::from_secs(state.config.session_ttl_hours * 3600),
        state.config.cookie_options(),
    );
    Ok((token, cookie))
}
