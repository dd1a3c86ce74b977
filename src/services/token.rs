// src/services/token.rs

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, RolePermissions, TokenType},
};

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;
pub const PASSWORD_RESET_TTL_SECS: i64 = 15 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("assinatura inválida")]
    InvalidSignature,
    #[error("token expirado")]
    Expired,
    #[error("token malformado: {0}")]
    Malformed(String),
    #[error("tipo de token inesperado")]
    WrongType,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Emite e verifica JWTs RS256.
///
/// Só a chave privada assina; a verificação usa apenas a pública. Qualquer
/// outro algoritmo no cabeçalho (HS256, `none`) é rejeitado.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn from_rsa_pem(private_pem: &[u8], public_pem: &[u8]) -> anyhow::Result<Self> {
        let encoding_key =
            EncodingKey::from_rsa_pem(private_pem).context("Chave privada RSA inválida")?;
        let decoding_key =
            DecodingKey::from_rsa_pem(public_pem).context("Chave pública RSA inválida")?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Ok(Self { encoding_key, decoding_key, validation })
    }

    /// `grants` só entra no access token; refresh e reset carregam apenas o `sub`.
    pub fn issue(
        &self,
        subject: Uuid,
        grants: Option<&RolePermissions>,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject,
            role: grants.map(|g| g.role.clone()),
            permissions: grants.map(|g| g.permissions.clone()),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            typ: token_type,
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn issue_access(&self, subject: Uuid, grants: &RolePermissions) -> Result<IssuedToken, AppError> {
        self.issue(subject, Some(grants), TokenType::Access, Duration::seconds(ACCESS_TOKEN_TTL_SECS))
    }

    pub fn issue_refresh(&self, subject: Uuid) -> Result<IssuedToken, AppError> {
        self.issue(subject, None, TokenType::Refresh, Duration::seconds(REFRESH_TOKEN_TTL_SECS))
    }

    pub fn issue_password_reset(&self, subject: Uuid) -> Result<IssuedToken, AppError> {
        self.issue(subject, None, TokenType::PasswordReset, Duration::seconds(PASSWORD_RESET_TTL_SECS))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.typ != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PRIVATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/jwt_private.pem");
    const PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/jwt_public.pem");
    const OTHER_PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/other_public.pem");

    fn service() -> TokenService {
        TokenService::from_rsa_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap()
    }

    fn seller() -> RolePermissions {
        RolePermissions {
            role: "seller".into(),
            permissions: vec!["catalog:create".into(), "catalog:update".into()],
        }
    }

    #[test]
    fn access_token_carries_role_and_permissions() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let issued = svc.issue_access(user_id, &seller()).unwrap();

        let claims = svc.verify_as(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role.as_deref(), Some("seller"));
        assert!(claims.has_permission("catalog:update"));
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);
    }

    #[test]
    fn refresh_token_has_no_grants() {
        let svc = service();
        let issued = svc.issue_refresh(Uuid::new_v4()).unwrap();
        let claims = svc.verify_as(&issued.token, TokenType::Refresh).unwrap();
        assert!(claims.role.is_none());
        assert!(claims.permissions.is_none());
    }

    #[test]
    fn tokens_issued_back_to_back_differ() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let a = svc.issue_refresh(user_id).unwrap();
        let b = svc.issue_refresh(user_id).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let issued = svc
            .issue(Uuid::new_v4(), None, TokenType::Access, Duration::seconds(-120))
            .unwrap();
        assert_eq!(svc.verify(&issued.token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn token_signed_by_another_key_is_rejected() {
        let issued = service().issue_access(Uuid::new_v4(), &seller()).unwrap();
        let other = TokenService::from_rsa_pem(PRIVATE_PEM, OTHER_PUBLIC_PEM).unwrap();
        assert_eq!(other.verify(&issued.token).unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn hmac_token_is_rejected() {
        let claims = json!({
            "sub": Uuid::new_v4(),
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 600,
            "jti": Uuid::new_v4(),
            "typ": "access",
            "permissions": ["catalog:delete"]
        });
        let forged = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(b"segredo")).unwrap();
        assert_eq!(service().verify(&forged).unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn garbage_and_missing_subject_are_malformed() {
        let svc = service();
        assert!(matches!(svc.verify("isto.nao.e-um-jwt"), Err(TokenError::Malformed(_))));

        let no_sub = json!({ "exp": Utc::now().timestamp() + 600, "iat": 0, "typ": "access" });
        let token = encode(
            &Header::new(Algorithm::RS256),
            &no_sub,
            &EncodingKey::from_rsa_pem(PRIVATE_PEM).unwrap(),
        )
        .unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn wrong_token_type_is_rejected() {
        let svc = service();
        let refresh = svc.issue_refresh(Uuid::new_v4()).unwrap();
        assert_eq!(svc.verify_as(&refresh.token, TokenType::Access).unwrap_err(), TokenError::WrongType);

        let reset = svc.issue_password_reset(Uuid::new_v4()).unwrap();
        assert_eq!(svc.verify_as(&reset.token, TokenType::Refresh).unwrap_err(), TokenError::WrongType);
    }
}
