//! Gatehouse backend: user accounts, cookie-based session tokens, and a
//! hashed single-use password reset flow backed by PostgreSQL.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod state;
pub mod utils;
