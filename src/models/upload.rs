// src/models/upload.rs

use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

// Arquivo recebido via multipart, ainda não validado
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    /// Content-Type declarado pelo cliente (pode ser omitido ou mentir)
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResult {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<UploadResult>,
}

// Só para a documentação OpenAPI do formulário multipart
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// Prefixo de destino (ex: "brands", "products/123")
    pub bucket: String,
    #[schema(value_type = Vec<String>, format = Binary)]
    pub file: Vec<String>,
}
