//! Credential handling: argon2 password digests and HS256 bearer tokens.
//!
//! The token format is opaque to the rest of the service. Callers issue
//! with a user id and get back an id on verification, nothing more.

use crate::error::{ServiceError, ServiceResult};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

static SECRET: OnceCell<Vec<u8>> = OnceCell::new();
static TOKEN_TTL_MINUTES: OnceCell<i64> = OnceCell::new();

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

fn secret() -> &'static [u8] {
    SECRET.get_or_init(|| match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => key.into_bytes(),
        _ => {
            let random: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!(
                "SECRET_KEY was unset or shorter than 64 bytes. Bearer tokens will invalidate every time the application restarts. Need a key? How about:\r\n{}",
                random
            );
            random.into_bytes()
        }
    })
}

fn token_ttl_minutes() -> i64 {
    *TOKEN_TTL_MINUTES.get_or_init(|| {
        std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60)
    })
}

/// Forces evaluation of the signing secret and token lifetime at startup so
/// a missing SECRET_KEY is logged before the first request.
pub fn init() {
    secret();
    token_ttl_minutes();
}

/// Issues a signed bearer credential for the given user.
pub fn issue_token(user_id: i32) -> ServiceResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(token_ttl_minutes())).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret()),
    )
    .map_err(|err| ServiceError::Internal(format!("token encoding failed: {err}")))
}

/// Verifies signature and expiry, then extracts the subject user id.
/// Returns None for anything malformed. Whether the id still resolves to a
/// user is the caller's problem.
pub fn verify_token(token: &str) -> Option<i32> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret()),
        &Validation::default(),
    )
    .ok()?;
    data.claims.sub.parse().ok()
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::warn!("Stored password digest failed to parse: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let digest = hash_password("hunter2hunter2").expect("hashing failed");
        assert!(verify_password("hunter2hunter2", &digest));
        assert!(!verify_password("wrong password", &digest));
    }

    #[test]
    fn token_round_trip() {
        let token = issue_token(42).expect("issue failed");
        assert_eq!(verify_token(&token), Some(42));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(verify_token("not-a-token"), None);
    }
}
