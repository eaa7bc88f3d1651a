//! Repository functions for user accounts.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::User;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, photo, phone, bio, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, photo, phone, bio, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Inserts a new account. A concurrent insert with the same email loses to
/// the unique index and surfaces as a conflict on the email field.
pub async fn insert(pool: &PgPool, user: &User) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, photo, phone, bio, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.photo)
    .bind(&user.phone)
    .bind(&user.bio)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(map_email_conflict)?;

    Ok(())
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    photo: Option<&str>,
    phone: Option<&str>,
    bio: Option<&str>,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = $1, photo = $2, phone = $3, bio = $4, updated_at = $5
        WHERE id = $6
        RETURNING id, name, email, password_hash, photo, phone, bio, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(photo)
    .bind(phone)
    .bind(bio)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(password_hash)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

fn map_email_conflict(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return AppError::conflict("email", "Email has already been registered");
        }
    }
    err.into()
}
