// src/db/variant_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{OptionView, VariantInput, VariantView},
};

// Tabelas: product_options, product_option_values, product_variants, variant_option_values.
// As escritas recebem o executor da transação do `VariantSyncEngine`.
#[derive(Clone)]
pub struct VariantRepository {
    pool: PgPool,
}

impl VariantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trava a linha do produto até o fim da transação; `None` se ele não existe.
    pub async fn lock_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(id)
    }

    // Apaga opções (e, em cascata, seus valores)
    pub async fn delete_options<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_options WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_variant_links<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM variant_option_values
            WHERE variant_id IN (SELECT id FROM product_variants WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_option<'e, E>(&self, executor: E, product_id: Uuid, name: &str) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO product_options (product_id, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(product_id)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Insere todos os valores de uma opção de uma vez; devolve `(id, valor)`.
    pub async fn insert_option_values<'e, E>(
        &self,
        executor: E,
        option_id: Uuid,
        values: &[String],
    ) -> Result<Vec<(Uuid, String)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            INSERT INTO product_option_values (option_id, value)
            SELECT $1, v.value FROM UNNEST($2::text[]) AS v(value)
            RETURNING id, value
            "#,
        )
        .bind(option_id)
        .bind(values)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Upsert por SKU. O `WHERE` do `DO UPDATE` impede sequestrar o SKU de outro
    /// produto: nesse caso a linha simplesmente não volta no `RETURNING`.
    pub async fn upsert_variants<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        variants: &[VariantInput],
    ) -> Result<Vec<(Uuid, String)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let skus: Vec<&str> = variants.iter().map(|v| v.sku.as_str()).collect();
        let prices: Vec<Decimal> = variants.iter().map(|v| v.price).collect();
        let weights: Vec<Decimal> = variants.iter().map(|v| v.weight).collect();
        let active: Vec<bool> = variants.iter().map(|v| v.is_active).collect();

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            INSERT INTO product_variants (product_id, sku, price, weight, is_active)
            SELECT $1, v.sku, v.price, v.weight, v.is_active
            FROM UNNEST($2::text[], $3::numeric[], $4::numeric[], $5::bool[])
                AS v(sku, price, weight, is_active)
            ON CONFLICT (sku) DO UPDATE SET
                price      = EXCLUDED.price,
                weight     = EXCLUDED.weight,
                is_active  = EXCLUDED.is_active,
                updated_at = NOW()
            WHERE product_variants.product_id = EXCLUDED.product_id
            RETURNING id, sku
            "#,
        )
        .bind(product_id)
        .bind(&skus)
        .bind(&prices)
        .bind(&weights)
        .bind(&active)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn insert_links<'e, E>(&self, executor: E, links: &[(Uuid, Uuid)]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (variant_ids, value_ids): (Vec<Uuid>, Vec<Uuid>) = links.iter().copied().unzip();

        let result = sqlx::query(
            r#"
            INSERT INTO variant_option_values (variant_id, option_value_id)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&variant_ids)
        .bind(&value_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_options(&self, product_id: Uuid) -> Result<Vec<OptionView>, AppError> {
        let options = sqlx::query_as::<_, OptionView>(
            r#"
            SELECT
                po.name,
                COALESCE(
                    ARRAY_AGG(pov.value ORDER BY pov.created_at, pov.value) FILTER (WHERE pov.id IS NOT NULL),
                    '{}'
                ) AS "values"
            FROM product_options po
            LEFT JOIN product_option_values pov ON pov.option_id = po.id
            WHERE po.product_id = $1
            GROUP BY po.id
            ORDER BY po.created_at, po.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn list_variants(&self, product_id: Uuid) -> Result<Vec<VariantView>, AppError> {
        let variants = sqlx::query_as::<_, VariantView>(
            r#"
            SELECT
                pv.id, pv.sku, pv.price, pv.weight, pv.is_active,
                COALESCE(
                    ARRAY_AGG(pov.value ORDER BY pov.value) FILTER (WHERE pov.id IS NOT NULL),
                    '{}'
                ) AS option_values
            FROM product_variants pv
            LEFT JOIN variant_option_values vov ON vov.variant_id = pv.id
            LEFT JOIN product_option_values pov ON pov.id = vov.option_value_id
            WHERE pv.product_id = $1
            GROUP BY pv.id
            ORDER BY pv.created_at, pv.sku
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(variants)
    }
}
