use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub iat: i64,  // issued at
    pub exp: i64,  // expiration time
}

impl Claims {
    pub fn new(user_id: Uuid, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours as i64);

        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Signs a session token for the given user. The same token is returned in
/// the response body and set as the session cookie.
pub fn create_session_token(user_id: Uuid, secret: &str, ttl_hours: u64) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, ttl_hours);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Decodes and validates a session token, returning its claims.
pub fn verify_session_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    // No leeway: a token is rejected from its expiry instant onward.
    let mut validation = Validation::default();
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, "secret", 24).expect("create token");
        let claims = verify_session_token(&token, "secret").expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn verification_rejects_a_different_secret() {
        let token = create_session_token(Uuid::new_v4(), "secret", 1).expect("create token");
        assert!(verify_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn verification_rejects_an_expired_token() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::seconds(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("secret".as_ref()),
        )
        .expect("encode");
        assert!(verify_session_token(&token, "secret").is_err());
    }

    #[test]
    fn verification_rejects_garbage() {
        assert!(verify_session_token("not-a-jwt", "secret").is_err());
    }
}
