//! Repository functions for the password reset lifecycle.
//!
//! A reset row is pending exactly while it exists: issuing a new token for a
//! user overwrites the previous one, and redemption deletes the row in the same
//! transaction that rewrites the password. Concurrent redeemers race on a
//! conditional `DELETE ... RETURNING`, so at most one of them can win.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::password_reset::PasswordReset;

/// Issues a reset token for the user, superseding any previous one.
///
/// The upsert keyed on `user_id` makes two racing requests last-writer-wins:
/// whichever digest lands last is the only one that redeems.
pub async fn create_reset_token(
    pool: &PgPool,
    user_id: Uuid,
    raw_value: &str,
    ttl_minutes: i64,
) -> Result<PasswordReset, AppError> {
    let token_hash = hash_reset_value(raw_value);
    let now = Utc::now();
    let expires_at = now + Duration::minutes(ttl_minutes);

    let record = sqlx::query_as::<_, PasswordReset>(
        r#"
        INSERT INTO password_reset_tokens (id, user_id, token_hash, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET token_hash = EXCLUDED.token_hash,
            created_at = EXCLUDED.created_at,
            expires_at = EXCLUDED.expires_at
        RETURNING id, user_id, token_hash, created_at, expires_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&token_hash)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Atomically claims an unexpired token matching `raw_value` and rewrites the
/// owner's password hash. Returns the owner's id, or `None` when no live
/// token matched (unknown, expired, superseded, or already redeemed).
pub async fn redeem_reset_token(
    pool: &PgPool,
    raw_value: &str,
    new_password_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, AppError> {
    let token_hash = hash_reset_value(raw_value);

    let mut tx = pool.begin().await?;

    // The delete is the claim: of N concurrent redeemers, one gets the row.
    let claimed = sqlx::query_as::<_, (Uuid,)>(
        r#"
        DELETE FROM password_reset_tokens
        WHERE token_hash = $1 AND expires_at > $2
        RETURNING user_id
        "#,
    )
    .bind(&token_hash)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((user_id,)) = claimed else {
        return Ok(None);
    };

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(new_password_hash)
    .bind(now)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        // Account deleted between issue and redeem; dropping the transaction
        // rolls the claim back.
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tx.commit().await?;

    Ok(Some(user_id))
}

pub async fn delete_expired_tokens(pool: &PgPool) -> Result<u64, AppError> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        DELETE FROM password_reset_tokens
        WHERE expires_at < $1
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

fn hash_reset_value(raw_value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_value.as_bytes());
    format!("{:x}", hasher.finalize())
}
