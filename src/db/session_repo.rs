// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::RefreshToken};

// Sessões de refresh token: uma linha por token emitido
#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn save<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, expires_at, revoked, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;
        Ok(saved)
    }

    /// Só devolve sessões ainda utilizáveis (não revogadas e não expiradas).
    pub async fn lookup(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        let found = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token, expires_at, revoked, created_at
            FROM refresh_tokens
            WHERE token = $1 AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    /// Revoga um token. O filtro `revoked = FALSE` torna a operação um
    /// compare-and-set: de duas rotações concorrentes, só uma afeta a linha.
    pub async fn revoke<'e, E>(&self, executor: E, token: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() WHERE token = $1 AND revoked = FALSE",
        )
        .bind(token)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn revoke_all<'e, E>(&self, executor: E, user_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
