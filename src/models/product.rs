// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::common::{validate_not_negative, validate_slug};

// ---
// Enums
// ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum ProductStatus {
    Draft,
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Pdf,
}

impl MediaType {
    // Rótulo do enum `media_type` no Postgres
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Pdf => "pdf",
        }
    }
}

// ---
// Produto
// ---
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub seller_id: Uuid,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item da listagem pública: nomes de marca/categoria e a imagem de capa
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProductListItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: ProductStatus,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub total_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub items: Vec<ProductListItem>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}

/// Filtros da listagem. `category` e `brand` aceitam vários valores
/// (`?category=camisetas&category=calcas`) e casam pelo slug.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilters {
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    /// Busca por nome (ILIKE)
    pub search: Option<String>,
    /// Padrão: apenas ACTIVE
    pub status: Option<ProductStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    pub description: Option<String>,
    /// Quando ausente, o vendedor é o usuário autenticado
    pub seller_id: Option<Uuid>,
    pub brand_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

// ---
// Atributos (chave/valor livre)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, Validate, sqlx::FromRow, ToSchema)]
pub struct AttributeEntry {
    #[validate(length(min = 1, message = "validation.required"))]
    pub attribute_key: String,
    #[validate(length(min = 1, message = "validation.required"))]
    pub attribute_value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductAttributesPayload {
    pub product_id: Uuid,
    #[validate(nested)]
    pub attributes: Vec<AttributeEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductAttributesResponse {
    pub product_id: Uuid,
    pub attributes: Vec<AttributeEntry>,
}

// ---
// Variantes
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OptionInput {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    #[validate(length(min = 1, message = "validation.required"))]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VariantInput {
    #[validate(length(min = 1, max = 100, message = "validation.sku_length"))]
    pub sku: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub weight: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Nomes dos valores de opção (ex: ["Red", "M"])
    #[serde(default)]
    pub option_values: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Estado desejado completo das variantes de um produto.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VariantSyncPayload {
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionInput>,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncedVariant {
    pub id: Uuid,
    pub sku: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantSyncResponse {
    pub product_id: Uuid,
    pub status: String,
    pub message: String,
    pub variants: Vec<SyncedVariant>,
    /// Valores citados pelas variantes que não existem em nenhuma opção
    pub dropped_option_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct VariantView {
    pub id: Uuid,
    pub sku: String,
    pub price: Decimal,
    pub weight: Decimal,
    pub is_active: bool,
    pub option_values: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductVariantsResponse {
    pub product_id: Uuid,
    pub options: Vec<OptionView>,
    pub variants: Vec<VariantView>,
}

// ---
// Mídia
// ---
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProductMedia {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub url: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub media_type: MediaType,
    pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MediaInput {
    pub variant_id: Option<Uuid>,
    #[validate(url(message = "validation.url"))]
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    #[validate(range(min = 0, message = "validation.non_negative"))]
    pub display_order: i32,
}

// O corpo é o próprio array JSON de mídias
#[derive(Debug, Deserialize, Validate)]
#[serde(transparent)]
pub struct ProductMediaPayload {
    #[validate(nested)]
    pub media: Vec<MediaInput>,
}

// ---
// SEO
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductSeoPayload {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub og_image_url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProductSeoRow {
    pub product_id: Uuid,
    pub meta_title: String,
    pub meta_description: String,
    pub og_image_url: String,
    pub keywords: sqlx::types::Json<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSeo {
    pub product_id: Uuid,
    pub meta_title: String,
    pub meta_description: String,
    pub og_image_url: String,
    pub keywords: Vec<String>,
}

impl From<ProductSeoRow> for ProductSeo {
    fn from(row: ProductSeoRow) -> Self {
        Self {
            product_id: row.product_id,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            og_image_url: row.og_image_url,
            keywords: row.keywords.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variant_defaults_when_fields_are_omitted() {
        let payload: VariantSyncPayload =
            serde_json::from_value(json!({ "variants": [{ "sku": "P-RED", "price": 10 }] })).unwrap();
        assert!(payload.options.is_empty());
        let variant = &payload.variants[0];
        assert!(variant.is_active);
        assert_eq!(variant.weight, Decimal::ZERO);
        assert!(variant.option_values.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn variant_validation_reaches_nested_items() {
        let payload: VariantSyncPayload = serde_json::from_value(json!({
            "options": [{ "name": "Color", "values": [] }],
            "variants": [{ "sku": "", "price": -1 }]
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let errors = errors.errors();
        assert!(errors.contains_key("options"));
        assert!(errors.contains_key("variants"));
    }

    #[test]
    fn media_payload_is_a_bare_array() {
        let payload: ProductMediaPayload = serde_json::from_value(json!([
            { "url": "https://cdn.example.com/a.png", "type": "image", "display_order": 1 },
            { "url": "https://cdn.example.com/b.pdf", "type": "pdf" }
        ]))
        .unwrap();
        assert_eq!(payload.media.len(), 2);
        assert_eq!(payload.media[1].media_type, MediaType::Pdf);
        assert_eq!(payload.media[1].display_order, 0);
    }

    #[test]
    fn media_type_label_matches_json() {
        for media_type in [MediaType::Image, MediaType::Video, MediaType::Pdf] {
            assert_eq!(serde_json::to_value(media_type).unwrap(), json!(media_type.as_str()));
        }
    }

    #[test]
    fn status_uses_screaming_case() {
        assert_eq!(serde_json::to_value(ProductStatus::Archived).unwrap(), json!("ARCHIVED"));
    }
}
