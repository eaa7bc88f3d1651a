//! Database-backed tests for the password reset lifecycle. They run against
//! `TEST_DATABASE_URL` and skip themselves when it is not set.

mod support;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use gatehouse_backend::{
    error::AppError,
    handlers::auth,
    models::user::{ForgotPasswordPayload, ResetPasswordPayload, User},
    repositories::{password_resets, users},
    utils::{
        password::{hash_password, verify_password},
        security,
    },
};

fn fresh_reset_value(user_id: Uuid) -> String {
    let secret = security::generate_token(security::RESET_SECRET_BYTES);
    security::build_reset_value(&secret, user_id)
}

async fn live_token_count(pool: &sqlx::PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("count tokens")
}

#[tokio::test]
async fn a_new_request_supersedes_the_previous_token() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("a_new_request_supersedes_the_previous_token");
        return;
    };
    let user = support::seed_user(&pool, &support::unique_email("supersede"), "OldPassword1").await;

    let first = fresh_reset_value(user.id);
    let second = fresh_reset_value(user.id);
    password_resets::create_reset_token(&pool, user.id, &first, 30)
        .await
        .expect("issue first token");
    password_resets::create_reset_token(&pool, user.id, &second, 30)
        .await
        .expect("issue second token");

    assert_eq!(live_token_count(&pool, user.id).await, 1);

    let new_hash = hash_password("NewPassword1").expect("hash");
    let stale = password_resets::redeem_reset_token(&pool, &first, &new_hash, Utc::now())
        .await
        .expect("redeem stale");
    assert_eq!(stale, None, "superseded token must be dead");

    let fresh = password_resets::redeem_reset_token(&pool, &second, &new_hash, Utc::now())
        .await
        .expect("redeem fresh");
    assert_eq!(fresh, Some(user.id));
}

#[tokio::test]
async fn a_token_redeems_exactly_once_and_swaps_the_credentials() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("a_token_redeems_exactly_once_and_swaps_the_credentials");
        return;
    };
    let user = support::seed_user(&pool, &support::unique_email("single-use"), "OldPassword1").await;

    let raw_value = fresh_reset_value(user.id);
    password_resets::create_reset_token(&pool, user.id, &raw_value, 30)
        .await
        .expect("issue token");

    let new_hash = hash_password("NewPassword1").expect("hash");
    let redeemed = password_resets::redeem_reset_token(&pool, &raw_value, &new_hash, Utc::now())
        .await
        .expect("first redeem");
    assert_eq!(redeemed, Some(user.id));
    assert_eq!(live_token_count(&pool, user.id).await, 0);

    // Old password is dead, new one works.
    let reloaded: User = users::find_by_id(&pool, user.id)
        .await
        .expect("reload user")
        .expect("user exists");
    assert!(!verify_password("OldPassword1", &reloaded.password_hash).unwrap());
    assert!(verify_password("NewPassword1", &reloaded.password_hash).unwrap());

    // Replaying the same link fails and leaves the password alone.
    let replay = password_resets::redeem_reset_token(&pool, &raw_value, &new_hash, Utc::now())
        .await
        .expect("replay redeem");
    assert_eq!(replay, None);
}

#[tokio::test]
async fn an_expired_token_cannot_be_redeemed() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("an_expired_token_cannot_be_redeemed");
        return;
    };
    let user = support::seed_user(&pool, &support::unique_email("expired"), "OldPassword1").await;

    let raw_value = fresh_reset_value(user.id);
    password_resets::create_reset_token(&pool, user.id, &raw_value, 30)
        .await
        .expect("issue token");

    // Backdate the expiry instead of waiting thirty minutes.
    sqlx::query("UPDATE password_reset_tokens SET expires_at = NOW() - INTERVAL '1 second' WHERE user_id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .expect("backdate expiry");

    let new_hash = hash_password("NewPassword1").expect("hash");
    let redeemed = password_resets::redeem_reset_token(&pool, &raw_value, &new_hash, Utc::now())
        .await
        .expect("redeem expired");
    assert_eq!(redeemed, None);

    let reloaded = users::find_by_id(&pool, user.id)
        .await
        .expect("reload user")
        .expect("user exists");
    assert!(verify_password("OldPassword1", &reloaded.password_hash).unwrap());
}

#[tokio::test]
async fn an_unknown_token_cannot_be_redeemed() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("an_unknown_token_cannot_be_redeemed");
        return;
    };

    let new_hash = hash_password("NewPassword1").expect("hash");
    let bogus = fresh_reset_value(Uuid::new_v4());
    let redeemed = password_resets::redeem_reset_token(&pool, &bogus, &new_hash, Utc::now())
        .await
        .expect("redeem bogus");
    assert_eq!(redeemed, None);
}

#[tokio::test]
async fn cleanup_removes_only_expired_tokens() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("cleanup_removes_only_expired_tokens");
        return;
    };
    let expired_user =
        support::seed_user(&pool, &support::unique_email("cleanup-expired"), "Password1").await;
    let live_user =
        support::seed_user(&pool, &support::unique_email("cleanup-live"), "Password1").await;

    password_resets::create_reset_token(&pool, expired_user.id, &fresh_reset_value(expired_user.id), 30)
        .await
        .expect("issue expired token");
    sqlx::query("UPDATE password_reset_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE user_id = $1")
        .bind(expired_user.id)
        .execute(&pool)
        .await
        .expect("backdate expiry");
    password_resets::create_reset_token(&pool, live_user.id, &fresh_reset_value(live_user.id), 30)
        .await
        .expect("issue live token");

    let deleted = password_resets::delete_expired_tokens(&pool)
        .await
        .expect("cleanup");
    assert!(deleted >= 1);

    assert_eq!(live_token_count(&pool, expired_user.id).await, 0);
    assert_eq!(live_token_count(&pool, live_user.id).await, 1);
}

#[tokio::test]
async fn forgot_password_does_not_reveal_account_existence() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("forgot_password_does_not_reveal_account_existence");
        return;
    };
    let email = support::unique_email("enumeration");
    let user = support::seed_user(&pool, &email, "Password1").await;
    let state = support::test_state(pool);

    let payload: ForgotPasswordPayload =
        serde_json::from_value(serde_json::json!({ "email": email.as_str() }))
            .expect("deserialize");
    let known_body = auth::forgot_password(State(state.clone()), Json(payload))
        .await
        .expect("known email")
        .0;
    assert_eq!(live_token_count(&state.pool, user.id).await, 1);

    let payload: ForgotPasswordPayload =
        serde_json::from_value(serde_json::json!({ "email": support::unique_email("nobody") }))
            .expect("deserialize");
    let unknown_body = auth::forgot_password(State(state.clone()), Json(payload))
        .await
        .expect("unknown email must still succeed")
        .0;

    assert_eq!(
        known_body, unknown_body,
        "responses must not distinguish registered from unregistered emails"
    );
    // The unknown-email path does no token work; the seeded user's pending
    // token is untouched.
    assert_eq!(live_token_count(&state.pool, user.id).await, 1);
}

#[tokio::test]
async fn reset_password_rejects_a_bogus_token() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("reset_password_rejects_a_bogus_token");
        return;
    };
    let state = support::test_state(pool);

    let payload: ResetPasswordPayload =
        serde_json::from_value(serde_json::json!({ "password": "NewPassword1" }))
            .expect("deserialize");
    let err = auth::reset_password(
        State(state),
        Path(fresh_reset_value(Uuid::new_v4())),
        Json(payload),
    )
    .await
    .expect_err("bogus token");

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(json["message"], "Invalid or expired reset token");
}

#[tokio::test]
async fn duplicate_email_registration_is_a_conflict() {
    let Some(pool) = support::test_pool().await else {
        support::skip_notice("duplicate_email_registration_is_a_conflict");
        return;
    };
    let email = support::unique_email("duplicate");
    support::seed_user(&pool, &email, "Password1").await;

    let password_hash = hash_password("Password2").expect("hash");
    let second = User::new("Another User".to_string(), email, password_hash);
    let err = users::insert(&pool, &second)
        .await
        .expect_err("duplicate email must be rejected");
    match err {
        AppError::Conflict { field, message } => {
            assert_eq!(field, "email");
            assert_eq!(message, "Email has already been registered");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&second.email)
        .fetch_one(&pool)
        .await
        .expect("count users");
    assert_eq!(count, 1);
}
