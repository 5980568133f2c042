//! User accounts: registration and credential checks.
//!
//! Passwords are stored as `pbkdf2_sha256$<iterations>$<salt>$<hash>` with base64 salt
//! and hash, so the iteration count can be raised without breaking existing rows.

use std::num::NonZeroU32;

use base64::{engine::general_purpose, Engine};
use ring::{
    pbkdf2,
    rand::{SecureRandom, SystemRandom},
};
use sqlx::{query_as, SqlitePool};

use crate::{error::ApiError, model::User};

const HASH_SCHEME: &str = "pbkdf2_sha256";
const HASH_ITERATIONS: u32 = 100_000;
const SALT_BYTES: usize = 16;
const CREDENTIAL_LEN: usize = 32;

// Verified against when the username is unknown, so both rejection paths do the same work.
const DUMMY_HASH: &str =
    "pbkdf2_sha256$100000$AAAAAAAAAAAAAAAAAAAAAA==$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Inserts a new user with a freshly salted password hash.
///
/// The `UNIQUE` constraint on `users.username` is what rejects duplicates; a collision
/// surfaces as [`ApiError::DuplicateUser`] and leaves the table untouched.
pub async fn create_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let password_hash = hash_password(password)?;

    let result = query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) \
         RETURNING id, username, email, password_hash",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::DuplicateUser(username.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the user when `password` matches the stored hash for `username`.
///
/// An unknown username and a wrong password both yield `Ok(None)`.
pub async fn verify_credentials(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let user = query_as::<_, User>(
        "SELECT id, username, email, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => Ok(Some(user)),
        Some(_) => Ok(None),
        None => {
            std::hint::black_box(verify_password(password, DUMMY_HASH));
            Ok(None)
        }
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let iterations = NonZeroU32::new(HASH_ITERATIONS)
        .ok_or_else(|| ApiError::Internal("hash iteration count is zero".into()))?;

    let mut salt = [0u8; SALT_BYTES];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| ApiError::Internal("system randomness unavailable".into()))?;

    let mut credential = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut credential,
    );

    Ok(format!(
        "{}${}${}${}",
        HASH_SCHEME,
        iterations,
        general_purpose::STANDARD.encode(salt),
        general_purpose::STANDARD.encode(credential)
    ))
}

/// Constant-time check of `password` against an encoded hash. Malformed hashes never match.
fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(4, '$');
    let (Some(scheme), Some(iterations), Some(salt), Some(credential)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }

    let Some(iterations) = iterations.parse().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(credential)) = (
        general_purpose::STANDARD.decode(salt),
        general_purpose::STANDARD.decode(credential),
    ) else {
        return false;
    };

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &credential,
    )
    .is_ok()
}
