/// Password Hashing and Verification
///
/// bcrypt work runs on the blocking pool so request workers stay responsive.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AppError;

lazy_static! {
    /// Stand-in hash with the same cost as stored ones, built on first use.
    static ref DUMMY_HASH: Option<String> = hash("session-auth-dummy-password", DEFAULT_COST).ok();
}

/// Hash a password for storage.
///
/// # Errors
/// Returns an internal error if bcrypt fails or the blocking task is lost
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a candidate password against a stored bcrypt hash.
///
/// # Errors
/// Returns an internal error if the stored hash is unreadable
pub async fn verify_password(candidate: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(candidate, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Spend the same bcrypt work as [`verify_password`] for an account that does
/// not exist. Always reports a mismatch.
///
/// # Errors
/// Returns an internal error if the blocking task is lost
pub async fn verify_dummy_password(candidate: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify(candidate, dummy);
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_password() {
        let hash = hash_password("secret123".to_string()).await.expect("Failed to hash password");

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let hash = hash_password("secret123".to_string()).await.unwrap();

        assert!(verify_password("secret123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("secret124".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_hash_is_an_error() {
        let result = verify_password("secret123".to_string(), "not-a-bcrypt-hash".to_string()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dummy_verification_never_matches() {
        assert!(DUMMY_HASH.as_deref().map_or(false, |h| h.starts_with("$2")));

        assert!(!verify_dummy_password("secret123".to_string()).await.unwrap());
        assert!(!verify_dummy_password("session-auth-dummy-password".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_verification_costs_a_bcrypt_round() {
        let hash = hash_password("secret123".to_string()).await.unwrap();
        // Warm the lazy hash so only the verify is timed.
        verify_dummy_password(String::new()).await.unwrap();

        let started = std::time::Instant::now();
        verify_password("wrong".to_string(), hash).await.unwrap();
        let real = started.elapsed();

        let started = std::time::Instant::now();
        verify_dummy_password("wrong".to_string()).await.unwrap();
        let dummy = started.elapsed();

        assert!(dummy * 4 >= real, "dummy {:?} vs real {:?}", dummy, real);
    }
}
