// src/db/brand_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::brand::{Brand, BrandListRow, CreateBrandPayload, UpdateBrandPayload},
};

#[derive(Clone)]
pub struct BrandRepository {
    pool: PgPool,
}

impl BrandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateBrandPayload) -> Result<Brand, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name, slug, logo_url, website_url, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.logo_url)
        .bind(&payload.website_url)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(brand)
    }

    // Atualização parcial: NULL (ou string vazia nos campos obrigatórios) mantém o valor atual
    pub async fn update(&self, id: Uuid, payload: &UpdateBrandPayload) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands SET
                name        = COALESCE(NULLIF($1, ''), name),
                slug        = COALESCE(NULLIF($2, ''), slug),
                logo_url    = COALESCE($3, logo_url),
                website_url = COALESCE($4, website_url),
                description = COALESCE($5, description),
                is_active   = COALESCE($6, is_active),
                updated_at  = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.logo_url)
        .bind(&payload.website_url)
        .bind(&payload.description)
        .bind(payload.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(brand)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<BrandListRow>, AppError> {
        let rows = sqlx::query_as::<_, BrandListRow>(
            r#"
            SELECT *, COUNT(*) OVER() AS total_count
            FROM brands
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Usado quando a página pedida está além do fim (a janela não devolve linhas)
    pub async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
