// src/services/password.rs

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::common::error::AppError;

// bcrypt é CPU-bound: sempre fora das threads do runtime (spawn_blocking).

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::WeakOrEmptyPassword);
    }

    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

    Ok(hashed)
}

/// `Ok(false)` para senha incorreta; `Err` só quando o hash armazenado é ilegível.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash_password("correct horse battery").await.unwrap();
        assert_ne!(hashed, "correct horse battery");
        assert!(verify_password("correct horse battery", &hashed).await.unwrap());
        assert!(!verify_password("wrong horse battery", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_different_salts() {
        let a = hash_password("mesma-senha-longa").await.unwrap();
        let b = hash_password("mesma-senha-longa").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        assert!(matches!(hash_password("").await, Err(AppError::WeakOrEmptyPassword)));
    }

    #[tokio::test]
    async fn corrupted_hash_is_an_error() {
        assert!(matches!(
            verify_password("qualquer", "isto-nao-e-bcrypt").await,
            Err(AppError::BcryptError(_))
        ));
    }
}
