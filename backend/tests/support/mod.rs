#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use gatehouse_backend::{
    config::{Config, SmtpConfig},
    models::user::User,
    repositories::users,
    state::AppState,
    utils::{email::Mailer, password::hash_password},
};

/// Connects to `TEST_DATABASE_URL` and applies migrations. Returns `None`
/// when the variable is unset so database-backed tests can skip themselves
/// on machines without a Postgres instance.
pub async fn test_pool() -> Option<PgPool> {
    let url = env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

/// Prints the standard skip notice for database-backed tests.
pub fn skip_notice(test: &str) {
    eprintln!("--- skipping {test}: TEST_DATABASE_URL not set ---");
}

/// A config with fixed secrets and a mailer that never touches the network,
/// for calling handlers directly.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "testsecret".to_string(),
        session_ttl_hours: 24,
        reset_token_ttl_minutes: 30,
        frontend_url: "http://localhost:3000".to_string(),
        cookie_secure: true,
        port: 0,
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "no-reply@gatehouse.local".to_string(),
            skip_send: true,
        },
    }
}

/// Wraps a pool into the shared state handlers expect.
pub fn test_state(pool: PgPool) -> AppState {
    let config = test_config();
    let mailer = Mailer::from_config(&config.smtp).expect("build mailer");
    AppState::new(Arc::new(pool), config, mailer)
}

/// Inserts an account with the given credentials and returns it.
pub async fn seed_user(pool: &PgPool, email: &str, password: &str) -> User {
    let password_hash = hash_password(password).expect("hash password");
    let user = User::new("Test User".to_string(), email.to_string(), password_hash);
    users::insert(pool, &user).await.expect("insert user");
    user
}

/// Produces an email that cannot collide across test runs sharing a database.
pub fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, Uuid::new_v4())
}
