// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[sqlx(rename = "password")]
    pub password_hash: String,

    pub phone_number: String,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Cargo do usuário e o conjunto de permissões herdado dele.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RolePermissions {
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

// ---
// JWT
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    PasswordReset,
}

// Estrutura de dados ("claims") dentro do JWT.
// `role`/`permissions` só existem no access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub typ: TokenType,
}

impl Claims {
    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|p| p == scope))
    }
}

// ---
// Payloads
// ---
fn validate_e164(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or_default();
    let valid = (8..=15).contains(&digits.len())
        && !digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("e164");
    err.message = Some("validation.phone_e164".into());
    Err(err)
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, message = "validation.full_name_length"))]
    pub full_name: String,
    #[validate(email(message = "validation.email"))]
    pub email: String,
    #[validate(length(min = 12, max = 72, message = "validation.password_length"))]
    pub password: String,
    #[validate(custom(function = "validate_e164"))]
    pub phone_number: String,
    /// Nome do cargo (ex: "customer", "seller")
    #[validate(length(min = 1, message = "validation.required"))]
    pub user_type: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
    #[validate(length(min = 1, message = "validation.required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub token: String,
    #[validate(length(min = 12, max = 72, message = "validation.password_length"))]
    pub password: String,
}

// ---
// Respostas
// ---
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub company_id: Option<Uuid>,
    pub roles: String,
    pub permissions: Vec<String>,
}

impl UserInfo {
    pub fn new(user: &User, grants: &RolePermissions) -> Self {
        Self {
            user_id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            company_id: user.company_id,
            roles: grants.role.clone(),
            permissions: grants.permissions.clone(),
        }
    }
}

// Resposta de autenticação (login e refresh)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_info: UserInfo,
    /// Instante de expiração do access token
    pub expires_in: DateTime<Utc>,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_info: UserInfo,
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Option<Vec<String>>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            role: Some("seller".into()),
            permissions,
            iat: 0,
            exp: 0,
            jti: Uuid::new_v4(),
            typ: TokenType::Access,
        }
    }

    #[test]
    fn has_permission_checks_exact_scope() {
        let c = claims(Some(vec!["catalog:create".into(), "catalog:update".into()]));
        assert!(c.has_permission("catalog:create"));
        assert!(!c.has_permission("catalog:delete"));
        assert!(!c.has_permission("catalog"));
        assert!(!claims(None).has_permission("catalog:create"));
    }

    #[test]
    fn token_type_uses_snake_case() {
        assert_eq!(serde_json::to_string(&TokenType::PasswordReset).unwrap(), "\"password_reset\"");
    }

    #[test]
    fn register_payload_rules() {
        let mut payload = RegisterUserPayload {
            full_name: "Ana Souza".into(),
            email: "ana@example.com".into(),
            password: "senha-bem-longa-123".into(),
            phone_number: "+5511999999999".into(),
            user_type: "customer".into(),
        };
        assert!(payload.validate().is_ok());

        payload.phone_number = "11999999999".into();
        payload.password = "curta".into();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone_number"));
        assert!(fields.contains_key("password"));
    }
}
