// src/models/brand.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::common::validate_slug;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem paginada: a marca + o total via COUNT(*) OVER()
#[derive(Debug, sqlx::FromRow)]
pub struct BrandListRow {
    #[sqlx(flatten)]
    pub brand: Brand,
    pub total_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBrandPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(url(message = "validation.url"))]
    pub logo_url: Option<String>,
    #[validate(url(message = "validation.url"))]
    pub website_url: Option<String>,
    pub description: Option<String>,
}

// Atualização parcial: campos ausentes mantêm o valor atual
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBrandPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(url(message = "validation.url"))]
    pub logo_url: Option<String>,
    #[validate(url(message = "validation.url"))]
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandListResponse {
    pub items: Vec<Brand>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}
