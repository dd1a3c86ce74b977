// src/models/common.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::ValidationError;

use crate::common::error::AppError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

// Resposta padrão das operações de escrita
#[derive(Debug, Serialize, ToSchema)]
pub struct GenericResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl GenericResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: "success".into(), message: message.into(), id: None }
    }

    pub fn created(message: impl Into<String>, id: Uuid) -> Self {
        Self { id: Some(id), ..Self::success(message) }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Página (começa em 1)
    pub page: Option<i64>,
    /// Itens por página (máximo 100)
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Devolve `(page, limit)` já validados; valores ausentes usam o padrão.
    pub fn resolve(&self, default_limit: i64) -> Result<(i64, i64), AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit);
        if page < 1 || limit < 1 {
            return Err(AppError::BadRequest("page e limit devem ser positivos".into()));
        }
        let limit = limit.min(MAX_PAGE_LIMIT);
        // O OFFSET resultante precisa caber em um BIGINT
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::BadRequest("page fora do intervalo".into()));
        }
        Ok((page, limit))
    }
}

/// Só chame com valores vindos de `PageQuery::resolve`.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

// ---
// Validações customizadas compartilhadas
// ---
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("slug");
    err.message = Some("validation.slug".into());
    Err(err)
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("validation.non_negative".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("camiseta-basica-2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Camiseta").is_err());
        assert!(validate_slug("com espaco").is_err());
        assert!(validate_slug("-inicio").is_err());
    }

    #[test]
    fn negative_decimals_are_rejected() {
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(1999, 2)).is_ok());
    }

    #[test]
    fn page_query_defaults_and_bounds() {
        assert_eq!(PageQuery::default().resolve(DEFAULT_PAGE_LIMIT).unwrap(), (1, 20));
        let big = PageQuery { page: Some(3), limit: Some(1_000) };
        assert_eq!(big.resolve(DEFAULT_PAGE_LIMIT).unwrap(), (3, MAX_PAGE_LIMIT));
        let zero = PageQuery { page: Some(0), limit: None };
        assert!(matches!(zero.resolve(DEFAULT_PAGE_LIMIT), Err(AppError::BadRequest(_))));
        assert_eq!(offset(3, 20), 40);
    }

    #[test]
    fn page_whose_offset_overflows_is_rejected() {
        let huge = PageQuery { page: Some(i64::MAX), limit: Some(100) };
        assert!(matches!(huge.resolve(DEFAULT_PAGE_LIMIT), Err(AppError::BadRequest(_))));

        let last = i64::MAX / MAX_PAGE_LIMIT + 1;
        let edge = PageQuery { page: Some(last), limit: Some(MAX_PAGE_LIMIT) };
        assert_eq!(edge.resolve(DEFAULT_PAGE_LIMIT).unwrap(), (last, MAX_PAGE_LIMIT));
    }
}
