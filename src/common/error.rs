// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{
    common::{db_utils::translate_db_error, i18n::I18nStore},
    middleware::i18n::Locale,
    services::token::TokenError,
};

// Nosso tipo de erro de domínio. Os handlers convertem para `ApiError`
// (já traduzido) através de `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Senha vazia")]
    WeakOrEmptyPassword,

    #[error("Tipo de usuário desconhecido: {0}")]
    UnknownUserType(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token de autenticação ausente")]
    MissingToken,

    #[error("Token inválido: {0}")]
    Token(#[from] TokenError),

    #[error("Refresh token inválido, revogado ou expirado")]
    InvalidRefreshToken,

    #[error("Token de redefinição de senha inválido")]
    ResetTokenInvalid,

    #[error("Permissão ausente: {0}")]
    Forbidden(String),

    /// O valor é a chave do recurso no catálogo de traduções (`resources.*`).
    #[error("Recurso não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueViolation(String),

    #[error("Violação de chave estrangeira: {0}")]
    ForeignKeyViolation(String),

    #[error("Violação de NOT NULL: {0}")]
    NotNullViolation(String),

    #[error("SKU já pertence a outro produto: {0}")]
    SkuConflict(String),

    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedFileType(String),

    #[error("Corpo da requisição acima do limite")]
    PayloadTooLarge,

    #[error("Erro no armazenamento de arquivos: {0}")]
    StorageError(#[from] object_store::Error),

    // Sem `#[from]`: a conversão passa pela tradução de SQLSTATE (ver abaixo).
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Todo `?` sobre um `sqlx::Error` já sai classificado (unique, FK, not-null).
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        translate_db_error(e)
    }
}

/// Erro pronto para a resposta HTTP, com a mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::WeakOrEmptyPassword
            | AppError::UnknownUserType(_)
            | AppError::ForeignKeyViolation(_)
            | AppError::NotNullViolation(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::Token(_)
            | AppError::InvalidRefreshToken
            | AppError::ResetTokenInvalid => StatusCode::UNAUTHORIZED,

            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::UniqueViolation(_)
            | AppError::SkuConflict(_) => StatusCode::CONFLICT,

            AppError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave de tradução + argumentos de interpolação.
    fn message_key(&self, locale: &Locale, i18n: &I18nStore) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("errors.validation", vec![]),
            AppError::BadRequest(reason) => ("errors.bad_request", vec![("reason", reason.clone())]),
            AppError::WeakOrEmptyPassword => ("errors.weak_password", vec![]),
            AppError::UnknownUserType(user_type) => {
                ("errors.unknown_user_type", vec![("user_type", user_type.clone())])
            }
            AppError::EmailAlreadyExists => ("errors.email_exists", vec![]),
            AppError::InvalidCredentials => ("errors.invalid_credentials", vec![]),
            AppError::MissingToken => ("errors.missing_token", vec![]),
            AppError::Token(TokenError::Expired) => ("errors.token_expired", vec![]),
            AppError::Token(_) => ("errors.invalid_token", vec![]),
            AppError::InvalidRefreshToken => ("errors.invalid_refresh_token", vec![]),
            AppError::ResetTokenInvalid => ("errors.reset_token_invalid", vec![]),
            AppError::Forbidden(scope) => ("errors.forbidden", vec![("scope", scope.clone())]),
            AppError::NotFound(resource) => {
                let resource = i18n.translate(&locale.0, &format!("resources.{resource}"));
                ("errors.not_found", vec![("resource", resource)])
            }
            AppError::UniqueViolation(_) => ("errors.unique_violation", vec![]),
            AppError::ForeignKeyViolation(_) => ("errors.foreign_key_violation", vec![]),
            AppError::NotNullViolation(_) => ("errors.not_null_violation", vec![]),
            AppError::SkuConflict(sku) => ("errors.sku_conflict", vec![("sku", sku.clone())]),
            AppError::UnsupportedFileType(file) => ("errors.unsupported_file", vec![("file", file.clone())]),
            AppError::PayloadTooLarge => ("errors.payload_too_large", vec![]),
            AppError::StorageError(_) => ("errors.upload_failed", vec![]),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ("errors.internal", vec![]),
        }
    }

    /// Traduz o erro para o idioma da requisição.
    ///
    /// Erros 5xx são logados com o detalhe completo; o cliente recebe apenas
    /// a mensagem genérica.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let (key, args) = self.message_key(locale, i18n);
        let error = i18n.translate_with(&locale.0, key, &args);

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = Map::new();
                collect_validation_details(errors, "", locale, i18n, &mut fields);
                Some(Value::Object(fields))
            }
            AppError::UniqueViolation(detail)
            | AppError::ForeignKeyViolation(detail)
            | AppError::NotNullViolation(detail) => Some(json!({ "constraint": detail })),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Achata erros aninhados (`variants[0].sku`) num único mapa campo -> mensagens.
fn collect_validation_details(
    errors: &ValidationErrors,
    prefix: &str,
    locale: &Locale,
    i18n: &I18nStore,
    out: &mut Map<String, Value>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(key) => Value::String(i18n.translate(&locale.0, key)),
                        None => Value::String(e.code.to_string()),
                    })
                    .collect();
                out.insert(path, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, &path, locale, i18n, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_details(inner, &format!("{path}[{index}]"), locale, i18n, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos devem ser válidos")
    }

    #[test]
    fn maps_each_family_to_its_status() {
        assert_eq!(AppError::WeakOrEmptyPassword.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ForeignKeyViolation("fk".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Token(TokenError::Expired).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("catalog:create".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("brand").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::SkuConflict("P-RED".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::UnsupportedFileType("a.txt".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(AppError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_message_with_arguments() {
        let api = AppError::Forbidden("catalog:delete".into())
            .to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert!(api.error.contains("catalog:delete"));
        assert!(api.details.is_none());
    }

    #[test]
    fn not_found_uses_translated_resource_name() {
        let api = AppError::NotFound("brand").to_api_error(&Locale("pt".into()), &store());
        assert!(api.error.starts_with("Marca"));

        let api = AppError::NotFound("brand").to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.error, "Brand not found.");
    }

    #[test]
    fn server_errors_hide_internal_detail() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
    }

    #[derive(validator::Validate)]
    struct Line {
        #[validate(length(min = 1, max = 100, message = "validation.sku_length"))]
        sku: String,
    }

    #[derive(validator::Validate)]
    struct Form {
        #[validate(email(message = "validation.email"))]
        email: String,
        #[validate(nested)]
        variants: Vec<Line>,
    }

    #[test]
    fn validation_details_include_nested_paths() {
        use validator::Validate;

        let form = Form {
            email: "nao-e-email".into(),
            variants: vec![Line { sku: String::new() }],
        };
        let errors = form.validate().expect_err("formulário inválido");

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "One or more fields are invalid.");

        let details = api.details.expect("erros de validação devem trazer detalhes");
        assert_eq!(details["email"][0], "The e-mail provided is invalid.");
        assert_eq!(details["variants[0].sku"][0], "SKU must have between 1 and 100 characters.");
    }
}
