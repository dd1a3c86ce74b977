// src/services/category_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CategoryRepository,
    models::{
        category::{Category, CategoryListResponse, CreateCategoryPayload, UpdateCategoryPayload},
        common::GenericResponse,
    },
};

#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
    pool: PgPool,
}

impl CategoryService {
    pub fn new(repo: CategoryRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // Pai inexistente é barrado pela FK (400)
    pub async fn create_category(&self, payload: &CreateCategoryPayload) -> Result<GenericResponse, AppError> {
        let category = self.repo.create(payload).await?;
        tracing::info!(category_id = %category.id, level = category.level, "🗂️ Categoria criada");
        Ok(GenericResponse::created("Category Created Successfully", category.id))
    }

    pub async fn update_category(&self, id: Uuid, payload: &UpdateCategoryPayload) -> Result<GenericResponse, AppError> {
        // Mover uma categoria para dentro dela mesma criaria um ciclo
        if let Some(parent_id) = payload.parent_id {
            if self.repo.is_descendant_or_self(id, parent_id).await? {
                return Err(AppError::BadRequest("a categoria não pode ser pai de si mesma".into()));
            }
        }

        // Mover a categoria arrasta a subárvore inteira: os níveis são recalculados na mesma transação
        let mut tx = self.pool.begin().await?;
        let category = self
            .repo
            .update(&mut *tx, id, payload)
            .await?
            .ok_or(AppError::NotFound("category"))?;
        if payload.parent_id.is_some() {
            let releveled = self.repo.relevel_descendants(&mut *tx, id).await?;
            tracing::debug!(category_id = %id, releveled, "Níveis da subárvore recalculados");
        }
        tx.commit().await?;

        Ok(GenericResponse::created("Category Updated Successfully", category.id))
    }

    // Filhas viram raízes e suas subárvores descem de nível; produtos na categoria barram a remoção
    pub async fn delete_category(&self, id: Uuid) -> Result<GenericResponse, AppError> {
        let mut tx = self.pool.begin().await?;
        let children = self.repo.detach_children(&mut *tx, id).await?;
        for child_id in &children {
            self.repo.relevel_descendants(&mut *tx, *child_id).await?;
        }
        if self.repo.delete(&mut *tx, id).await? == 0 {
            return Err(AppError::NotFound("category"));
        }
        tx.commit().await?;
        Ok(GenericResponse::success("Category Deleted Successfully"))
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("category"))
    }

    pub async fn list_categories(&self) -> Result<CategoryListResponse, AppError> {
        let items = self.repo.list().await?;
        Ok(CategoryListResponse { total_count: items.len() as i64, items })
    }
}
