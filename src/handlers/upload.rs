// src/handlers/upload.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermCatalogCreate, RequirePermission},
    },
    models::upload::{UploadForm, UploadResponse, UploadedFile},
};

fn multipart_error(e: MultipartError) -> AppError {
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
        _ => AppError::BadRequest(e.body_text()),
    }
}

/// Lê o formulário: um campo `bucket` e um ou mais campos `file`.
/// Campos desconhecidos são ignorados.
async fn read_form(mut multipart: Multipart) -> Result<(String, Vec<UploadedFile>), AppError> {
    let mut bucket: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "bucket" => bucket = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadedFile { file_name, content_type, data });
            }
            other => tracing::debug!(field = %other, "Campo multipart ignorado"),
        }
    }

    let bucket = bucket.ok_or_else(|| AppError::BadRequest("campo 'bucket' ausente".into()))?;
    Ok((bucket, files))
}

#[utoipa::path(
    post,
    path = "/v1/upload-brand-image",
    tag = "Uploads",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Arquivos enviados", body = UploadResponse),
        (status = 400, description = "Formulário inválido"),
        (status = 413, description = "Corpo acima de 50 MiB"),
        (status = 415, description = "Tipo de arquivo não permitido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_brand_image(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCatalogCreate>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (bucket, files) = read_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let results = app_state
        .upload_service
        .upload_files(&bucket, files)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(UploadResponse { success: true, count: results.len(), data: results }))
}
