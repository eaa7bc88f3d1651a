//! Models that represent user accounts and the authentication API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
/// Database representation of a user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Display name chosen at registration.
    pub name: String,
    /// Email address used for login; unique across accounts.
    pub email: String,
    /// Argon2 hash of the user's password. Plaintext is never stored.
    pub password_hash: String,
    /// Optional profile photo URL.
    pub photo: Option<String>,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Optional short biography.
    pub bio: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh account row with a generated id and current timestamps.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            photo: None,
            phone: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating a new account.
///
/// String fields default to empty when absent so that a missing field and a
/// blank field produce the same per-field validation error.
pub struct RegisterPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
/// Payload submitted when a logged-in user changes their password.
pub struct ChangePasswordPayload {
    /// Existing password, verified before the change is applied.
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    /// Replacement password stored if verification succeeds.
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
/// Payload for requesting a password reset email.
pub struct ForgotPasswordPayload {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
/// Payload carrying the replacement password during a reset.
pub struct ResetPasswordPayload {
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Payload for updating portions of the caller's own profile.
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub photo: Option<String>,
    pub phone: Option<String>,
    #[validate(length(max = 250, message = "Bio must not exceed 250 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
/// Public view of an account; never exposes the password hash.
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            photo: user.photo,
            phone: user.phone,
            bio: user.bio,
        }
    }
}

#[derive(Debug, Serialize)]
/// Body returned after a successful registration or login. The same session
/// token is also set as a cookie on the response.
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
