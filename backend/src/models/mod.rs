//! Data models shared across database access and API handlers.

pub mod password_reset;
pub mod user;
