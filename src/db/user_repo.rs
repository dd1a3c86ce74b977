// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation_on, error::AppError},
    models::auth::{Role, RolePermissions, User},
};

// O repositório de usuários, responsável pelas tabelas 'users', 'roles' e 'user_roles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, company_id, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, company_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário. E-mail duplicado vira `EmailAlreadyExists`.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: &str,
        password_hash: &str,
        phone_number: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, password, phone_number, company_id, created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(phone_number)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "users_email_key") {
                AppError::EmailAlreadyExists
            } else {
                e.into()
            }
        })
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_role_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    pub async fn assign_role<'e, E>(&self, executor: E, user_id: Uuid, role_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role_id = EXCLUDED.role_id
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Cargo + permissões do usuário numa única consulta.
    /// `None` se o usuário não tem cargo atribuído.
    pub async fn find_role_permissions<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<RolePermissions>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let grants = sqlx::query_as::<_, RolePermissions>(
            r#"
            SELECT
                r.name AS role,
                COALESCE(
                    ARRAY_AGG(p.name ORDER BY p.name) FILTER (WHERE p.name IS NOT NULL),
                    '{}'
                ) AS permissions
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN roles_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            GROUP BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(grants)
    }
}
