// src/services/notifier.rs

use async_trait::async_trait;

use crate::{common::error::AppError, models::auth::User, services::token::IssuedToken};

/// Entrega o token de redefinição de senha ao usuário (e-mail, fila, ...).
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    async fn send_reset_token(&self, user: &User, token: &IssuedToken) -> Result<(), AppError>;
}

// Implementação padrão: só registra no log. O token em si vai em nível debug.
pub struct LogNotifier;

#[async_trait]
impl PasswordResetNotifier for LogNotifier {
    async fn send_reset_token(&self, user: &User, token: &IssuedToken) -> Result<(), AppError> {
        tracing::info!(
            user_id = %user.id,
            expires_at = %token.expires_at,
            "📧 Token de redefinição de senha emitido"
        );
        tracing::debug!(user_id = %user.id, token = %token.token, "Token de redefinição");
        Ok(())
    }
}
