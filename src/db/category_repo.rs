// src/db/category_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::category::{Category, CreateCategoryPayload, UpdateCategoryPayload},
};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // O nível é derivado do pai: raiz = 0, filho = nível do pai + 1
    pub async fn create(&self, payload: &CreateCategoryPayload) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, parent_id, level)
            VALUES (
                $1, $2, $3,
                COALESCE((SELECT parent.level + 1 FROM categories parent WHERE parent.id = $3), 0)
            )
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(payload.parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateCategoryPayload,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name      = COALESCE(NULLIF($1, ''), name),
                slug      = COALESCE(NULLIF($2, ''), slug),
                parent_id = COALESCE($3, parent_id),
                level     = CASE
                                WHEN $3::uuid IS NULL THEN level
                                ELSE COALESCE((SELECT parent.level + 1 FROM categories parent WHERE parent.id = $3), 0)
                            END,
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(payload.parent_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    /// Recalcula o nível de todos os descendentes de `root_id` a partir do nível atual dele.
    pub async fn relevel_descendants<'e, E>(&self, executor: E, root_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id, level FROM categories WHERE id = $1
                UNION ALL
                SELECT c.id, s.level + 1 FROM categories c JOIN subtree s ON c.parent_id = s.id
            )
            UPDATE categories c
            SET level = s.level, updated_at = NOW()
            FROM subtree s
            WHERE c.id = s.id AND c.id <> $1 AND c.level <> s.level
            "#,
        )
        .bind(root_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Solta as filhas diretas (viram raízes de nível 0) e devolve seus ids.
    pub async fn detach_children<'e, E>(&self, executor: E, parent_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE categories SET parent_id = NULL, level = 0, updated_at = NOW() WHERE parent_id = $1 RETURNING id",
        )
        .bind(parent_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    // Árvore achatada: raízes primeiro, depois cada nível em ordem alfabética
    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY level, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    /// `true` se `candidate` é o próprio `id` ou está abaixo dele na árvore.
    pub async fn is_descendant_or_self(&self, id: Uuid, candidate: Uuid) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM categories WHERE id = $1
                UNION ALL
                SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)
            "#,
        )
        .bind(id)
        .bind(candidate)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }
}
