// src/handlers/category.rs

use axum::{
    extract::{Path, State},
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
        category::{Category, CategoryListResponse, CreateCategoryPayload, UpdateCategoryPayload},
        common::GenericResponse,
    },
};

#[utoipa::path(
    post,
    path = "/v1/create-category",
    tag = "Categories",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = GenericResponse),
        (status = 400, description = "Dados inválidos ou categoria pai inexistente"),
        (status = 409, description = "Slug já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogCreate>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .category_service
        .create_category(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/v1/update-category/{id}",
    tag = "Categories",
    request_body = UpdateCategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = GenericResponse),
        (status = 400, description = "Pai inválido (ciclo na árvore)"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogUpdate>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<Json<GenericResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .category_service
        .update_category(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/v1/delete-category/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria removida", body = GenericResponse),
        (status = 400, description = "Categoria ainda referenciada por produtos"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenericResponse>, ApiError> {
    let response = app_state
        .category_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/v1/get-category/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria", body = Category),
        (status = 404, description = "Categoria não encontrada")
    )
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = app_state
        .category_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(category))
}

#[utoipa::path(
    get,
    path = "/v1/get-all-category",
    tag = "Categories",
    responses((status = 200, description = "Todas as categorias, por nível", body = CategoryListResponse))
)]
pub async fn get_all_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let response = app_state
        .category_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}
