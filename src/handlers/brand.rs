// src/handlers/brand.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermCatalogCreate, PermCatalogDelete, PermCatalogUpdate, RequirePermission},
    },
    models::{
        brand::{Brand, BrandListResponse, CreateBrandPayload, UpdateBrandPayload},
        common::{GenericResponse, PageQuery, DEFAULT_PAGE_LIMIT},
    },
};

#[utoipa::path(
    post,
    path = "/v1/create-brand",
    tag = "Brands",
    request_body = CreateBrandPayload,
    responses(
        (status = 201, description = "Marca criada", body = GenericResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão catalog:create"),
        (status = 409, description = "Slug já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogCreate>,
    Json(payload): Json<CreateBrandPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .brand_service
        .create_brand(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/v1/update-brand/{id}",
    tag = "Brands",
    request_body = UpdateBrandPayload,
    params(("id" = Uuid, Path, description = "ID da marca")),
    responses(
        (status = 200, description = "Marca atualizada", body = GenericResponse),
        (status = 404, description = "Marca não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBrandPayload>,
) -> Result<Json<GenericResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .brand_service
        .update_brand(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/v1/delete-brand/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "ID da marca")),
    responses(
        (status = 200, description = "Marca removida", body = GenericResponse),
        (status = 400, description = "Marca ainda referenciada por produtos"),
        (status = 404, description = "Marca não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenericResponse>, ApiError> {
    let response = app_state
        .brand_service
        .delete_brand(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/v1/get-brand/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "ID da marca")),
    responses(
        (status = 200, description = "Marca", body = Brand),
        (status = 404, description = "Marca não encontrada")
    )
)]
pub async fn get_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Brand>, ApiError> {
    let brand = app_state
        .brand_service
        .get_brand(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(brand))
}

#[utoipa::path(
    get,
    path = "/v1/get-all-brands",
    tag = "Brands",
    params(PageQuery),
    responses(
        (status = 200, description = "Página de marcas", body = BrandListResponse),
        (status = 400, description = "Paginação inválida")
    )
)]
pub async fn get_all_brands(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(page): Query<PageQuery>,
) -> Result<Json<BrandListResponse>, ApiError> {
    let (page, limit) = page
        .resolve(DEFAULT_PAGE_LIMIT)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .brand_service
        .list_brands(page, limit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}
