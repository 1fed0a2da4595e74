use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash `plain + pepper` with a fresh salt.
pub fn hash_password(plain: &str, pepper: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let peppered = format!("{plain}{pepper}");
    let hash = Argon2::default()
        .hash_password(peppered.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain + pepper` against a stored hash.
///
/// `Ok(false)` is a mismatch; `Err` means the stored hash could not be used.
pub fn verify_password(plain: &str, pepper: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    let peppered = format!("{plain}{pepper}");
    match Argon2::default().verify_password(peppered.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verify_password error");
            Err(anyhow::anyhow!(e.to_string()))
        }
    }
}

/// [`hash_password`] on tokio's blocking pool.
pub async fn spawn_hash_password(plain: String, pepper: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain, &pepper))
        .await
        .context("join password hashing task")?
}

/// [`verify_password`] on tokio's blocking pool.
pub async fn spawn_verify_password(
    plain: String,
    pepper: String,
    hash: String,
) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &pepper, &hash))
        .await
        .context("join password verify task")?
}
