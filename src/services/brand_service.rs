// src/services/brand_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BrandRepository,
    models::{
        brand::{Brand, BrandListResponse, CreateBrandPayload, UpdateBrandPayload},
        common::{offset, GenericResponse},
    },
};

#[derive(Clone)]
pub struct BrandService {
    repo: BrandRepository,
}

impl BrandService {
    pub fn new(repo: BrandRepository) -> Self {
        Self { repo }
    }

    pub async fn create_brand(&self, payload: &CreateBrandPayload) -> Result<GenericResponse, AppError> {
        let brand = self.repo.create(payload).await?;
        tracing::info!(brand_id = %brand.id, slug = %brand.slug, "🏷️ Marca criada");
        Ok(GenericResponse::created("Brand Created Successfully", brand.id))
    }

    pub async fn update_brand(&self, id: Uuid, payload: &UpdateBrandPayload) -> Result<GenericResponse, AppError> {
        let brand = self.repo.update(id, payload).await?.ok_or(AppError::NotFound("brand"))?;
        Ok(GenericResponse::created("Brand Updated Successfully", brand.id))
    }

    // Marca em uso por algum produto: a FK barra a remoção (400)
    pub async fn delete_brand(&self, id: Uuid) -> Result<GenericResponse, AppError> {
        if self.repo.delete(id).await? == 0 {
            return Err(AppError::NotFound("brand"));
        }
        Ok(GenericResponse::success("Brand Deleted Successfully"))
    }

    pub async fn get_brand(&self, id: Uuid) -> Result<Brand, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("brand"))
    }

    pub async fn list_brands(&self, page: i64, limit: i64) -> Result<BrandListResponse, AppError> {
        let rows = self.repo.list(limit, offset(page, limit)).await?;

        let total_count = match rows.first() {
            Some(row) => row.total_count,
            None => self.repo.count().await?,
        };

        Ok(BrandListResponse {
            items: rows.into_iter().map(|row| row.brand).collect(),
            total_count,
            page,
            limit,
        })
    }
}
