// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{
        AttributeEntry, CreateProductPayload, MediaInput, Product, ProductListItem, ProductMedia,
        ProductSeoPayload, ProductSeoRow, ProductStatus, UpdateProductPayload,
    },
};

/// Filtros já normalizados para a consulta de listagem.
#[derive(Debug, Default)]
pub struct ProductQuery {
    pub category_slugs: Vec<String>,
    pub brand_slugs: Vec<String>,
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, seller_id: Uuid, payload: &CreateProductPayload) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, slug, description, seller_id, brand_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(seller_id)
        .bind(payload.brand_id)
        .bind(payload.category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateProductPayload) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name        = COALESCE(NULLIF($1, ''), name),
                slug        = COALESCE(NULLIF($2, ''), slug),
                description = COALESCE($3, description),
                brand_id    = COALESCE($4, brand_id),
                category_id = COALESCE($5, category_id),
                status      = COALESCE($6, status),
                updated_at  = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(payload.brand_id)
        .bind(payload.category_id)
        .bind(payload.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    // "Remoção" de produto é arquivamento: variantes e pedidos continuam referenciando a linha
    pub async fn archive(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE products SET status = 'ARCHIVED', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1 AND status = 'ACTIVE'")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<ProductListItem>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.name, p.slug, p.description, p.status, p.created_at,
                b.name AS brand_name,
                c.name AS category_name,
                (
                    SELECT m.url FROM product_media m
                    WHERE m.product_id = p.id AND m.type = 'image'
                    ORDER BY m.display_order, m.created_at
                    LIMIT 1
                ) AS image_url,
                COUNT(*) OVER() AS total_count
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.status =
            "#,
        );
        builder.push_bind(query.status.unwrap_or(ProductStatus::Active));

        if !query.category_slugs.is_empty() {
            builder.push(" AND c.slug = ANY(");
            builder.push_bind(&query.category_slugs);
            builder.push(")");
        }

        if !query.brand_slugs.is_empty() {
            builder.push(" AND b.slug = ANY(");
            builder.push_bind(&query.brand_slugs);
            builder.push(")");
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            builder.push(" AND p.name ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(search)));
        }

        builder.push(" ORDER BY p.created_at DESC, p.id LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let items = builder
            .build_query_as::<ProductListItem>()
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    // ---
    // Atributos
    // ---
    pub async fn replace_attributes<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        attributes: &[AttributeEntry],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let keys: Vec<&str> = attributes.iter().map(|a| a.attribute_key.as_str()).collect();
        let values: Vec<&str> = attributes.iter().map(|a| a.attribute_value.as_str()).collect();

        // Inserção em massa usando UNNEST; chave repetida no mesmo produto vira update
        let result = sqlx::query(
            r#"
            INSERT INTO products_attributes (product_id, attribute_key, attribute_value)
            SELECT $1, a.key, a.value
            FROM UNNEST($2::text[], $3::text[]) AS a(key, value)
            ON CONFLICT (product_id, attribute_key)
            DO UPDATE SET attribute_value = EXCLUDED.attribute_value, updated_at = NOW()
            "#,
        )
        .bind(product_id)
        .bind(&keys)
        .bind(&values)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_attributes<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products_attributes WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_attributes(&self, product_id: Uuid) -> Result<Vec<AttributeEntry>, AppError> {
        let attributes = sqlx::query_as::<_, AttributeEntry>(
            "SELECT attribute_key, attribute_value FROM products_attributes WHERE product_id = $1 ORDER BY attribute_key",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attributes)
    }

    // ---
    // Mídia
    // ---
    pub async fn delete_media<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_media WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Linhas cujo `variant_id` é de outro produto não são inseridas.
    pub async fn insert_media<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        media: &[MediaInput],
    ) -> Result<Vec<ProductMedia>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant_ids: Vec<Option<Uuid>> = media.iter().map(|m| m.variant_id).collect();
        let urls: Vec<&str> = media.iter().map(|m| m.url.as_str()).collect();
        let types: Vec<&str> = media.iter().map(|m| m.media_type.as_str()).collect();
        let orders: Vec<i32> = media.iter().map(|m| m.display_order).collect();

        let inserted = sqlx::query_as::<_, ProductMedia>(
            r#"
            INSERT INTO product_media (product_id, variant_id, url, type, display_order)
            SELECT $1, m.variant_id, m.url, m.type::media_type, m.display_order
            FROM UNNEST($2::uuid[], $3::text[], $4::text[], $5::int4[])
                AS m(variant_id, url, type, display_order)
            WHERE m.variant_id IS NULL
               OR m.variant_id IN (SELECT v.id FROM product_variants v WHERE v.product_id = $1)
            RETURNING id, product_id, variant_id, url, type, display_order
            "#,
        )
        .bind(product_id)
        .bind(&variant_ids)
        .bind(&urls)
        .bind(&types)
        .bind(&orders)
        .fetch_all(executor)
        .await?;
        Ok(inserted)
    }

    pub async fn list_media(&self, product_id: Uuid) -> Result<Vec<ProductMedia>, AppError> {
        let media = sqlx::query_as::<_, ProductMedia>(
            r#"
            SELECT id, product_id, variant_id, url, type, display_order
            FROM product_media
            WHERE product_id = $1
            ORDER BY display_order, created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(media)
    }

    // ---
    // SEO / publicação
    // ---

    /// Rascunho vira ACTIVE; arquivado continua arquivado.
    /// Devolve 0 quando o produto não existe.
    pub async fn publish<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET status = CASE WHEN status = 'ARCHIVED' THEN status ELSE 'ACTIVE' END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn upsert_seo<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        payload: &ProductSeoPayload,
    ) -> Result<ProductSeoRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ProductSeoRow>(
            r#"
            INSERT INTO product_seo (product_id, meta_title, meta_description, og_image_url, keywords)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id) DO UPDATE SET
                meta_title       = EXCLUDED.meta_title,
                meta_description = EXCLUDED.meta_description,
                og_image_url     = EXCLUDED.og_image_url,
                keywords         = EXCLUDED.keywords,
                updated_at       = NOW()
            RETURNING product_id, meta_title, meta_description, og_image_url, keywords
            "#,
        )
        .bind(product_id)
        .bind(&payload.meta_title)
        .bind(&payload.meta_description)
        .bind(&payload.og_image_url)
        .bind(sqlx::types::Json(&payload.keywords))
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_seo(&self, product_id: Uuid) -> Result<Option<ProductSeoRow>, AppError> {
        let row = sqlx::query_as::<_, ProductSeoRow>(
            r#"
            SELECT product_id, meta_title, meta_description, og_image_url, keywords
            FROM product_seo
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// `%` e `_` digitados pelo usuário são literais na busca
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("camiseta"), "camiseta");
    }
}
