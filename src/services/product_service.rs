// src/services/product_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{product_repo::ProductQuery, ProductRepository},
    models::{
        common::{offset, GenericResponse, PageQuery},
        product::{
            AttributeEntry, CreateProductPayload, MediaInput, Product, ProductAttributesResponse,
            ProductFilters, ProductListResponse, ProductMedia, ProductSeo, ProductSeoPayload,
            UpdateProductPayload,
        },
    },
};

pub const DEFAULT_PRODUCT_LIMIT: i64 = 40;

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(repo: ProductRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_product(
        &self,
        seller_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<GenericResponse, AppError> {
        let product = self.repo.create(seller_id, payload).await?;
        tracing::info!(product_id = %product.id, seller_id = %seller_id, "📦 Produto criado (DRAFT)");
        Ok(GenericResponse::created("Product Created Successfully", product.id))
    }

    pub async fn update_product(&self, id: Uuid, payload: &UpdateProductPayload) -> Result<GenericResponse, AppError> {
        let product = self.repo.update(id, payload).await?.ok_or(AppError::NotFound("product"))?;
        Ok(GenericResponse::created("Product Updated Successfully", product.id))
    }

    pub async fn archive_product(&self, id: Uuid) -> Result<GenericResponse, AppError> {
        if self.repo.archive(id).await? == 0 {
            return Err(AppError::NotFound("product"));
        }
        tracing::info!(product_id = %id, "🗄️ Produto arquivado");
        Ok(GenericResponse::success("Product Archived Successfully"))
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("product"))
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, AppError> {
        self.repo.find_active_by_slug(slug).await?.ok_or(AppError::NotFound("product"))
    }

    pub async fn list_products(&self, filters: ProductFilters) -> Result<ProductListResponse, AppError> {
        let (page, limit) = PageQuery { page: filters.page, limit: filters.limit }.resolve(DEFAULT_PRODUCT_LIMIT)?;

        let query = ProductQuery {
            category_slugs: normalize_slugs(filters.category),
            brand_slugs: normalize_slugs(filters.brand),
            search: filters.search,
            status: filters.status,
            limit,
            offset: offset(page, limit),
        };

        let items = self.repo.list(&query).await?;
        let total_count = items.first().map(|item| item.total_count).unwrap_or(0);

        Ok(ProductListResponse { items, total_count, page, limit })
    }

    // ---
    // Atributos: o conjunto enviado substitui o anterior
    // ---
    pub async fn replace_attributes(
        &self,
        product_id: Uuid,
        attributes: Vec<AttributeEntry>,
    ) -> Result<ProductAttributesResponse, AppError> {
        let attributes = dedupe_attributes(attributes);

        let mut tx = self.pool.begin().await?;
        self.repo.delete_attributes(&mut *tx, product_id).await?;
        if !attributes.is_empty() {
            // Produto inexistente estoura a FK aqui
            self.repo.replace_attributes(&mut *tx, product_id, &attributes).await?;
        }
        tx.commit().await?;

        Ok(ProductAttributesResponse { product_id, attributes })
    }

    pub async fn get_attributes(&self, product_id: Uuid) -> Result<ProductAttributesResponse, AppError> {
        let attributes = self.repo.list_attributes(product_id).await?;
        Ok(ProductAttributesResponse { product_id, attributes })
    }

    // ---
    // Mídia: a lista enviada substitui a anterior
    // ---
    pub async fn replace_media(&self, product_id: Uuid, media: &[MediaInput]) -> Result<Vec<ProductMedia>, AppError> {
        let mut tx = self.pool.begin().await?;
        self.repo.delete_media(&mut *tx, product_id).await?;
        let inserted = if media.is_empty() {
            Vec::new()
        } else {
            self.repo.insert_media(&mut *tx, product_id, media).await?
        };
        if inserted.len() != media.len() {
            return Err(AppError::BadRequest("variant_id não pertence a este produto".into()));
        }
        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn get_media(&self, product_id: Uuid) -> Result<Vec<ProductMedia>, AppError> {
        self.repo.list_media(product_id).await
    }

    // ---
    // SEO: gravar o SEO publica o produto
    // ---
    pub async fn save_seo(&self, product_id: Uuid, payload: &ProductSeoPayload) -> Result<ProductSeo, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.repo.publish(&mut *tx, product_id).await? == 0 {
            return Err(AppError::NotFound("product"));
        }
        let row = self.repo.upsert_seo(&mut *tx, product_id, payload).await?;

        tx.commit().await?;
        tracing::info!(product_id = %product_id, "🚀 SEO salvo, produto publicado");
        Ok(row.into())
    }

    pub async fn get_seo(&self, product_id: Uuid) -> Result<ProductSeo, AppError> {
        self.repo
            .find_seo(product_id)
            .await?
            .map(ProductSeo::from)
            .ok_or(AppError::NotFound("product_seo"))
    }
}

fn normalize_slugs(raw: Vec<String>) -> Vec<String> {
    let mut slugs: Vec<String> = raw
        .iter()
        .flat_map(|value| value.split(','))
        .map(|slug| slug.trim().to_lowercase())
        .filter(|slug| !slug.is_empty())
        .collect();
    slugs.sort();
    slugs.dedup();
    slugs
}

// Chave repetida: vale a última ocorrência, mantendo a posição da primeira
fn dedupe_attributes(attributes: Vec<AttributeEntry>) -> Vec<AttributeEntry> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<AttributeEntry> = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        match position.get(&attribute.attribute_key) {
            Some(&index) => unique[index] = attribute,
            None => {
                position.insert(attribute.attribute_key.clone(), unique.len());
                unique.push(attribute);
            }
        }
    }
    unique
}
