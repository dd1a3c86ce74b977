// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
///
/// Só decide com base nas `permissions` do access token; não consulta o banco.
/// Precisa rodar depois do `auth_guard`.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::MissingToken.to_api_error(&locale, &app_state.i18n_store))?;

        // B. Confere o escopo
        let required_perm = T::slug();
        if !user.0.has_permission(required_perm) {
            tracing::info!(
                user_id = %user.0.sub,
                scope = required_perm,
                "Acesso negado: permissão ausente"
            );
            return Err(AppError::Forbidden(required_perm.to_string())
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermCatalogCreate;
impl PermissionDef for PermCatalogCreate {
    fn slug() -> &'static str { "catalog:create" }
}

pub struct PermCatalogUpdate;
impl PermissionDef for PermCatalogUpdate {
    fn slug() -> &'static str { "catalog:update" }
}

pub struct PermCatalogDelete;
impl PermissionDef for PermCatalogDelete {
    fn slug() -> &'static str { "catalog:delete" }
}
