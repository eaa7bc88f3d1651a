//! Handlers for the caller's own profile.

use axum::{
    extract::{Extension, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateProfilePayload, User, UserResponse},
    repositories::users,
    state::AppState,
};

pub async fn get_me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Partial update: absent fields keep their current values. Email is not
/// updatable through this endpoint.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let user_id = user.id;
    let name = payload.name.unwrap_or(user.name);
    let photo = payload.photo.or(user.photo);
    let phone = payload.phone.or(user.phone);
    let bio = payload.bio.or(user.bio);

    let updated = users::update_profile(
        &state.pool,
        user_id,
        &name,
        photo.as_deref(),
        phone.as_deref(),
        bio.as_deref(),
    )
    .await?;

    Ok(Json(UserResponse::from(updated)))
}
