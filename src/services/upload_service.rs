// src/services/upload_service.rs

use std::sync::Arc;

use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use object_store::{path::Path as ObjectPath, Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

use crate::{
    common::error::AppError,
    models::upload::{UploadResult, UploadedFile},
};

pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "application/pdf"];
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

const SNIFF_LEN: usize = 512;
const OCTET_STREAM: &str = "application/octet-stream";

/// Detecta o tipo pelo conteúdo (assinaturas nos primeiros 512 bytes).
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if head.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        "image/webp"
    } else if head.starts_with(b"%PDF-") {
        "application/pdf"
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        "image/gif"
    } else if !head.is_empty() && head.iter().all(|&b| !is_binary_byte(b)) {
        "text/plain"
    } else {
        OCTET_STREAM
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Valida um arquivo e devolve o tipo que será gravado.
///
/// O tipo detectado precisa estar na lista; o declarado também, a menos que
/// seja ausente ou genérico (`application/octet-stream`).
pub fn validate_file(file: &UploadedFile) -> Result<&'static str, AppError> {
    let sniffed = sniff_content_type(&file.data);
    if !ALLOWED_CONTENT_TYPES.contains(&sniffed) {
        return Err(AppError::UnsupportedFileType(file.file_name.clone()));
    }

    let declared = file
        .content_type
        .as_deref()
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM);

    if let Some(declared) = declared {
        if !ALLOWED_CONTENT_TYPES.contains(&declared.as_str()) {
            return Err(AppError::UnsupportedFileType(file.file_name.clone()));
        }
    }

    Ok(sniffed)
}

/// `{bucket}/{nanos}{ext}`; a extensão vem do nome original, em minúsculas.
pub fn object_key(bucket: &str, file_name: &str, nanos: i64) -> String {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}/{}{}", bucket.trim_matches('/'), nanos, ext)
}

fn validate_bucket(bucket: &str) -> Result<(), AppError> {
    let trimmed = bucket.trim_matches('/');
    let valid = !trimmed.is_empty()
        && trimmed.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        });
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("bucket inválido: '{bucket}'")))
    }
}

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    max_concurrency: usize,
    // O backend local não aceita atributos no put
    attach_content_type: bool,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        public_base_url: impl Into<String>,
        max_concurrency: usize,
        attach_content_type: bool,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_concurrency: max_concurrency.max(1),
            attach_content_type,
        }
    }

    /// Envia vários arquivos em paralelo (no máximo `max_concurrency` ao mesmo tempo).
    ///
    /// Todos são validados antes do primeiro envio: um arquivo proibido não
    /// deixa os outros gravados pela metade. Falha de armazenamento em qualquer
    /// um falha a operação inteira. A ordem do resultado segue a dos arquivos.
    pub async fn upload_files(&self, bucket: &str, files: Vec<UploadedFile>) -> Result<Vec<UploadResult>, AppError> {
        validate_bucket(bucket)?;
        if files.is_empty() {
            return Err(AppError::BadRequest("nenhum arquivo enviado".into()));
        }

        let prepared = files
            .into_iter()
            .map(|file| validate_file(&file).map(|content_type| (file, content_type)))
            .collect::<Result<Vec<_>, AppError>>()?;

        // Um timestamp base por requisição + índice: chaves únicas mesmo com relógio grosso
        let base_nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let results: Vec<UploadResult> = stream::iter(prepared.into_iter().enumerate())
            .map(|(index, (file, content_type))| {
                let key = object_key(bucket, &file.file_name, base_nanos + index as i64);
                self.put_one(key, file, content_type)
            })
            .buffered(self.max_concurrency)
            .boxed()
            .try_collect()
            .await?;

        tracing::info!(bucket = %bucket, count = results.len(), "📤 Upload concluído");
        Ok(results)
    }

    async fn put_one(&self, key: String, file: UploadedFile, content_type: &'static str) -> Result<UploadResult, AppError> {
        let mut opts = PutOptions::default();
        if self.attach_content_type {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.into());
            opts.attributes = attributes;
        }

        let size = file.data.len();
        self.store
            .put_opts(&ObjectPath::from(key.as_str()), PutPayload::from(file.data), opts)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, file = %file.file_name, "Falha ao enviar arquivo: {}", e);
                AppError::StorageError(e)
            })?;

        tracing::debug!(key = %key, size, content_type, "Arquivo gravado");
        Ok(UploadResult { url: format!("{}/{}", self.public_base_url, key), key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF";
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";
    const PDF: &[u8] = b"%PDF-1.7\n%\xE2\xE3";

    fn file(name: &str, content_type: Option<&str>, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: content_type.map(str::to_owned),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn sniffs_known_signatures() {
        assert_eq!(sniff_content_type(PNG), "image/png");
        assert_eq!(sniff_content_type(JPEG), "image/jpeg");
        assert_eq!(sniff_content_type(WEBP), "image/webp");
        assert_eq!(sniff_content_type(PDF), "application/pdf");
        assert_eq!(sniff_content_type(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_content_type(b"hello, world\n"), "text/plain");
        assert_eq!(sniff_content_type(b"\0\x01\x02binario"), OCTET_STREAM);
        assert_eq!(sniff_content_type(b""), OCTET_STREAM);
    }

    #[test]
    fn accepts_allowed_content() {
        assert_eq!(validate_file(&file("logo.png", Some("image/png"), PNG)).unwrap(), "image/png");
        assert_eq!(validate_file(&file("manual.pdf", None, PDF)).unwrap(), "application/pdf");
        assert_eq!(
            validate_file(&file("foto.jpg", Some("application/octet-stream"), JPEG)).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn rejects_disallowed_content_even_with_allowed_declaration() {
        let err = validate_file(&file("script.png", Some("image/png"), b"#!/bin/sh\necho oi\n")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType(name) if name == "script.png"));
    }

    #[test]
    fn rejects_disallowed_declaration() {
        assert!(matches!(
            validate_file(&file("logo.png", Some("text/html; charset=utf-8"), PNG)),
            Err(AppError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn key_keeps_lowercase_extension() {
        assert_eq!(object_key("brands", "Logo.PNG", 42), "brands/42.png");
        assert_eq!(object_key("/products/abc/", "sem-extensao", 7), "products/abc/7");
    }

    #[test]
    fn bucket_must_be_a_safe_prefix() {
        assert!(validate_bucket("brands").is_ok());
        assert!(validate_bucket("products/123").is_ok());
        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("../etc").is_err());
        assert!(validate_bucket("a//b").is_err());
    }
}
