// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{Claims, TokenType},
    services::token::TokenError,
};

// Identidade autenticada, colocada nas extensions pelo `auth_guard`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Extrai o token de `Authorization: Bearer <token>` (esquema sem diferenciar maiúsculas).
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| TokenError::Malformed("cabeçalho Authorization não é ASCII".into()))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| TokenError::Malformed("cabeçalho Authorization sem esquema".into()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Malformed(format!("esquema '{scheme}' não suportado")).into());
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}

// ---
// Middleware: exige um access token válido
// ---
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let claims = bearer_token(request.headers())
        .and_then(|token| {
            app_state
                .token_service
                .verify_as(token, TokenType::Access)
                .map_err(AppError::from)
        })
        .map_err(|e| {
            tracing::debug!("Requisição rejeitada pelo auth_guard: {}", e);
            e.to_api_error(&locale, &app_state.i18n_store)
        })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                let app_state = AppState::from_ref(state);
                AppError::MissingToken
                    .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_scheme_in_any_case() {
        assert_eq!(bearer_token(&with_auth("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&with_auth("bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&with_auth("BEARER   abc ")).unwrap(), "abc");
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AppError::MissingToken)));
        assert!(matches!(bearer_token(&with_auth("Bearer ")), Err(AppError::MissingToken)));
        assert!(matches!(
            bearer_token(&with_auth("Basic dXNlcjpwYXNz")),
            Err(AppError::Token(TokenError::Malformed(_)))
        ));
        assert!(matches!(
            bearer_token(&with_auth("abc.def.ghi")),
            Err(AppError::Token(TokenError::Malformed(_)))
        ));
    }
}
