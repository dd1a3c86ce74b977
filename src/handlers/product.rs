// src/handlers/product.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermCatalogCreate, PermCatalogDelete, PermCatalogUpdate, RequirePermission},
    },
    models::{
        common::GenericResponse,
        product::{
            CreateProductPayload, MediaInput, Product, ProductAttributesPayload, ProductAttributesResponse,
            ProductFilters, ProductListResponse, ProductMedia, ProductMediaPayload, ProductSeo, ProductSeoPayload,
            ProductVariantsResponse, UpdateProductPayload, VariantSyncPayload, VariantSyncResponse,
        },
    },
};

// ---
// Produto
// ---
#[utoipa::path(
    post,
    path = "/v1/create-product",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado como DRAFT", body = GenericResponse),
        (status = 400, description = "Dados inválidos ou marca/categoria inexistente"),
        (status = 409, description = "Slug já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(claims): AuthenticatedUser,
    _perm: RequirePermission<PermCatalogCreate>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    // Sem seller_id explícito, quem vende é quem chamou
    let seller_id = payload.seller_id.unwrap_or(claims.sub);

    let response = app_state
        .product_service
        .create_product(seller_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/v1/update-product/{id}",
    tag = "Products",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = GenericResponse),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<GenericResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .product_service
        .update_product(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// Não apaga: arquiva
#[utoipa::path(
    delete,
    path = "/v1/delete-product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto arquivado", body = GenericResponse),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenericResponse>, ApiError> {
    let response = app_state
        .product_service
        .archive_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/v1/get-product/id/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product_by_id(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .product_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/v1/get-product/slug/{slug}",
    tag = "Products",
    params(("slug" = String, Path, description = "Slug do produto (apenas ACTIVE)")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado ou não publicado")
    )
)]
pub async fn get_product_by_slug(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .product_service
        .get_product_by_slug(&slug)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

// Query do axum-extra: aceita ?category=a&category=b
#[utoipa::path(
    get,
    path = "/v1/get-all-products",
    tag = "Products",
    params(ProductFilters),
    responses(
        (status = 200, description = "Página de produtos", body = ProductListResponse),
        (status = 400, description = "Filtros ou paginação inválidos")
    )
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let response = app_state
        .product_service
        .list_products(filters)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// ---
// Atributos
// ---
#[utoipa::path(
    post,
    path = "/v1/add-product-attribute",
    tag = "Products",
    request_body = ProductAttributesPayload,
    responses(
        (status = 200, description = "Conjunto de atributos substituído", body = ProductAttributesResponse),
        (status = 400, description = "Dados inválidos ou produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_product_attributes(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Json(payload): Json<ProductAttributesPayload>,
) -> Result<Json<ProductAttributesResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .product_service
        .replace_attributes(payload.product_id, payload.attributes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/v1/get-product-attribute/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Atributos do produto", body = ProductAttributesResponse))
)]
pub async fn get_product_attributes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductAttributesResponse>, ApiError> {
    let response = app_state
        .product_service
        .get_attributes(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// ---
// Variantes
// ---
#[utoipa::path(
    post,
    path = "/v1/add-product-variants/{id}",
    tag = "Products",
    request_body = VariantSyncPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Variantes sincronizadas", body = VariantSyncResponse),
        (status = 400, description = "Dados inválidos ou SKU repetido"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "SKU pertence a outro produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_product_variants(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VariantSyncPayload>,
) -> Result<Json<VariantSyncResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .variant_engine
        .sync(id, &payload.options, &payload.variants)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(VariantSyncResponse {
        product_id: id,
        status: "success".into(),
        message: "Variants Synced Successfully".into(),
        variants: outcome.variants,
        dropped_option_values: outcome.dropped_option_values,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/get-product-variants/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Opções e variantes do produto", body = ProductVariantsResponse))
)]
pub async fn get_product_variants(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductVariantsResponse>, ApiError> {
    let response = app_state
        .variant_engine
        .current_state(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// ---
// Mídia
// ---
#[utoipa::path(
    post,
    path = "/v1/add-product-media/{id}",
    tag = "Products",
    request_body = Vec<MediaInput>,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Lista de mídias substituída", body = Vec<ProductMedia>),
        (status = 400, description = "Dados inválidos, produto ou variante inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_product_media(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductMediaPayload>,
) -> Result<Json<Vec<ProductMedia>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let media = app_state
        .product_service
        .replace_media(id, &payload.media)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(media))
}

#[utoipa::path(
    get,
    path = "/v1/get-product-media/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Mídias do produto", body = Vec<ProductMedia>))
)]
pub async fn get_product_media(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductMedia>>, ApiError> {
    let media = app_state
        .product_service
        .get_media(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(media))
}

// ---
// SEO
// ---
#[utoipa::path(
    post,
    path = "/v1/add-product-seo/{id}",
    tag = "Products",
    request_body = ProductSeoPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "SEO gravado e produto publicado"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_product_seo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductSeoPayload>,
) -> Result<StatusCode, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .product_service
        .save_seo(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/get-product-seo/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "SEO do produto", body = ProductSeo),
        (status = 404, description = "SEO ainda não cadastrado")
    )
)]
pub async fn get_product_seo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductSeo>, ApiError> {
    let seo = app_state
        .product_service
        .get_seo(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(seo))
}
