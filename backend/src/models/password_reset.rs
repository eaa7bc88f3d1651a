//! Models for password reset tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
/// Database representation of a pending password reset.
///
/// Row presence is the pending state: redemption and supersession both delete
/// the row, so a token can never be redeemed twice.
pub struct PasswordReset {
    /// Unique identifier for the reset record.
    pub id: Uuid,
    /// Account this reset belongs to; at most one live row per account.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the raw reset value. The raw value itself is
    /// only ever present in the emailed link.
    pub token_hash: String,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Instant after which the token can no longer be redeemed.
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    /// True once the expiry instant has been reached.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
