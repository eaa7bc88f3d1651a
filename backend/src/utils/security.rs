use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

/// Number of random bytes backing a password reset secret.
pub const RESET_SECRET_BYTES: usize = 32;

/// Generates a hex-encoded random token from `byte_len` bytes of OS entropy.
pub fn generate_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Composes the raw reset value placed in the emailed link: the random secret
/// and the owning user id, dot-separated. Only its SHA-256 digest is ever
/// persisted or compared.
pub fn build_reset_value(secret_hex: &str, user_id: Uuid) -> String {
    format!("{}.{}", secret_hex, user_id)
}
