use std::sync::LazyLock;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Password does not match")]
    Mismatch,
    #[error("Hashing task failed: {0}")]
    Task(String),
}

const MEMORY_COST_KIB: u32 = 15_000;

/// Hashes on a blocking thread; argon2 is intentionally CPU-bound and must not
/// stall the async runtime. `time_cost` is the configurable cost factor.
#[tracing::instrument(name = "Computing password hash", skip_all)]
pub async fn compute_password_hash(
    password: Secret<String>,
    time_cost: u32,
) -> Result<Secret<String>, PasswordHashError> {
    tokio::task::spawn_blocking(move || hash_blocking(&password, time_cost))
        .await
        .map_err(|e| PasswordHashError::Task(e.to_string()))?
}

#[tracing::instrument(name = "Verifying password hash", skip_all)]
pub async fn verify_password_hash(
    expected_hash: Secret<String>,
    candidate: Secret<String>,
) -> Result<(), PasswordHashError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(expected_hash.expose_secret())
            .map_err(|e| PasswordHashError::Hashing(e.to_string()))?;

        Argon2::default()
            .verify_password(candidate.expose_secret().as_bytes(), &parsed)
            .map_err(|_| PasswordHashError::Mismatch)
    })
    .await
    .map_err(|e| PasswordHashError::Task(e.to_string()))?
}

fn hash_blocking(
    password: &Secret<String>,
    time_cost: u32,
) -> Result<Secret<String>, PasswordHashError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    let params = Params::new(MEMORY_COST_KIB, time_cost.max(1), 1, None)
        .map_err(|e| PasswordHashError::Hashing(e.to_string()))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| PasswordHashError::Hashing(e.to_string()))?
        .to_string();

    Ok(Secret::from(hash))
}

static DUMMY_HASH: LazyLock<Secret<String>> = LazyLock::new(|| {
    hash_blocking(&Secret::from("gatehouse-timing-dummy".to_string()), 2)
        .expect("static argon2 params are valid")
});

/// Runs a verification against a throwaway hash so that "unknown email" takes
/// about as long as "wrong password", keeping the two indistinguishable by
/// timing.
pub async fn equalize_hash_effort() {
    let _ = verify_password_hash(DUMMY_HASH.clone(), Secret::from("candidate".to_string())).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let password = Secret::from("Abc12345!".to_string());
        let hash = compute_password_hash(password.clone(), 2).await.unwrap();

        // PHC string, never the plaintext
        assert!(hash.expose_secret().starts_with("$argon2id$"));
        assert!(!hash.expose_secret().contains("Abc12345!"));

        verify_password_hash(hash.clone(), password).await.unwrap();

        let wrong = verify_password_hash(hash, Secret::from("Wrong123!".to_string())).await;
        assert!(matches!(wrong, Err(PasswordHashError::Mismatch)));
    }

    #[tokio::test]
    async fn two_hashes_of_same_password_differ() {
        let password = Secret::from("Abc12345!".to_string());
        let first = compute_password_hash(password.clone(), 2).await.unwrap();
        let second = compute_password_hash(password, 2).await.unwrap();
        assert_ne!(first.expose_secret(), second.expose_secret());
    }
}
