use std::env;

use crate::utils::cookies::{CookieOptions, SameSite};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of a session token, in hours. Cookie and JWT share it.
    pub session_ttl_hours: u64,
    /// Lifetime of a password reset token, in minutes.
    pub reset_token_ttl_minutes: i64,
    /// Base URL of the frontend, used for CORS and reset links.
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub port: u16,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// When set, reset emails are logged instead of sent. Local use only.
    pub skip_send: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost:5432/gatehouse".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let reset_token_ttl_minutes = env::var("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("SMTP_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@gatehouse.local".to_string()),
            skip_send: env::var("SMTP_SKIP_SEND")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        };

        Ok(Config {
            database_url,
            jwt_secret,
            session_ttl_hours,
            reset_token_ttl_minutes,
            frontend_url,
            cookie_secure,
            port,
            smtp,
        })
    }

    /// Attributes shared by every session cookie this service writes.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.cookie_secure,
            same_site: SameSite::None,
        }
    }
}
