// src/services/auth.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RefreshTokenRepository, UserRepository},
    models::{
        auth::{AuthResponse, RegisterResponse, RegisterUserPayload, RolePermissions, TokenType, User, UserInfo},
        common::GenericResponse,
    },
    services::{
        notifier::PasswordResetNotifier,
        password::{hash_password, verify_password},
        token::{IssuedToken, TokenService},
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: RefreshTokenRepository,
    token_service: TokenService,
    notifier: Arc<dyn PasswordResetNotifier>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        session_repo: RefreshTokenRepository,
        token_service: TokenService,
        notifier: Arc<dyn PasswordResetNotifier>,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, session_repo, token_service, notifier, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<RegisterResponse, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(&payload.password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria Usuário
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                payload.full_name.trim(),
                &payload.email.trim().to_lowercase(),
                &hashed_password,
                &payload.phone_number,
            )
            .await?; // Se falhar aqui, o tx sofre rollback automático ao sair do escopo (drop)

        // 3. Cargo pedido precisa existir
        let role = self
            .user_repo
            .find_role_by_name(&mut *tx, &payload.user_type)
            .await?
            .ok_or_else(|| AppError::UnknownUserType(payload.user_type.clone()))?;

        self.user_repo.assign_role(&mut *tx, user.id, role.id).await?;

        let grants = self
            .user_repo
            .find_role_permissions(&mut *tx, user.id)
            .await?
            .ok_or(AppError::NotFound("role"))?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(user_id = %user.id, role = %grants.role, "👤 Usuário registrado");

        Ok(RegisterResponse {
            user_info: UserInfo::new(&user, &grants),
            status: "success".into(),
            message: "User Registered Successfully".into(),
        })
    }

    // Falha de e-mail ou de senha devolve o mesmo erro (não revela quais e-mails existem)
    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let grants = self.grants_for(user.id).await?;
        let (access, refresh) = self.issue_pair(&user, &grants)?;

        self.session_repo
            .save(&self.pool, user.id, &refresh.token, refresh.expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "🔑 Login realizado");
        Ok(auth_response(&user, &grants, access, refresh, "Login Successfully"))
    }

    /// Rotação de refresh token: o token apresentado é revogado e um novo par
    /// é emitido. Revogação e gravação do novo token são atômicas; se outra
    /// requisição já rotacionou o mesmo token, esta falha.
    pub async fn refresh_token(&self, presented: &str) -> Result<AuthResponse, AppError> {
        // 1. Assinatura, validade e tipo
        let claims = self
            .token_service
            .verify_as(presented, TokenType::Refresh)
            .map_err(|e| {
                tracing::debug!("Refresh token rejeitado: {}", e);
                AppError::InvalidRefreshToken
            })?;

        // 2. Sessão ainda ativa no banco
        let session = self
            .session_repo
            .lookup(presented)
            .await?
            .filter(|s| s.user_id == claims.sub)
            .ok_or(AppError::InvalidRefreshToken)?;

        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        // 3. Permissões frescas: mudanças de cargo valem a partir da rotação
        let grants = self.grants_for(user.id).await?;
        let (access, refresh) = self.issue_pair(&user, &grants)?;

        // 4. Revoga o antigo e grava o novo na mesma transação
        let mut tx = self.pool.begin().await?;

        let revoked = self.session_repo.revoke(&mut *tx, presented).await?;
        if revoked == 0 {
            tracing::warn!(user_id = %user.id, "Refresh token reutilizado em rotação concorrente");
            return Err(AppError::InvalidRefreshToken);
        }

        self.session_repo
            .save(&mut *tx, user.id, &refresh.token, refresh.expires_at)
            .await?;

        tx.commit().await?;

        Ok(auth_response(&user, &grants, access, refresh, "Refresh Token Changed Successfully"))
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<GenericResponse, AppError> {
        let revoked = self.session_repo.revoke_all(&self.pool, user_id).await?;
        tracing::info!(user_id = %user_id, sessions = revoked, "🚪 Logout: sessões revogadas");
        Ok(GenericResponse::success("Logout Successfully"))
    }

    /// Sempre responde sucesso; o token só é emitido (e notificado) se o e-mail existir.
    pub async fn forgot_password(&self, email: &str) -> Result<GenericResponse, AppError> {
        match self.user_repo.find_by_email(&email.trim().to_lowercase()).await? {
            Some(user) => {
                let reset = self.token_service.issue_password_reset(user.id)?;
                self.notifier.send_reset_token(&user, &reset).await?;
            }
            None => tracing::debug!("Pedido de redefinição para e-mail não cadastrado"),
        }
        Ok(GenericResponse::success("Email sent successfully"))
    }

    // Troca a senha e derruba todas as sessões abertas do usuário
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<GenericResponse, AppError> {
        let claims = self
            .token_service
            .verify_as(token, TokenType::PasswordReset)
            .map_err(|e| {
                tracing::debug!("Token de redefinição rejeitado: {}", e);
                AppError::ResetTokenInvalid
            })?;

        let hashed_password = hash_password(new_password).await?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .user_repo
            .update_password(&mut *tx, claims.sub, &hashed_password)
            .await?;
        if updated == 0 {
            return Err(AppError::ResetTokenInvalid);
        }

        let revoked = self.session_repo.revoke_all(&mut *tx, claims.sub).await?;
        tx.commit().await?;

        tracing::info!(user_id = %claims.sub, sessions = revoked, "🔒 Senha redefinida");
        Ok(GenericResponse::success("Password reset successfully"))
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<UserInfo, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        let grants = self.grants_for(user.id).await?;
        Ok(UserInfo::new(&user, &grants))
    }

    async fn grants_for(&self, user_id: Uuid) -> Result<RolePermissions, AppError> {
        self.user_repo
            .find_role_permissions(&self.pool, user_id)
            .await?
            .ok_or(AppError::NotFound("role"))
    }

    fn issue_pair(&self, user: &User, grants: &RolePermissions) -> Result<(IssuedToken, IssuedToken), AppError> {
        let access = self.token_service.issue_access(user.id, grants)?;
        let refresh = self.token_service.issue_refresh(user.id)?;
        Ok((access, refresh))
    }
}

fn auth_response(
    user: &User,
    grants: &RolePermissions,
    access: IssuedToken,
    refresh: IssuedToken,
    message: &str,
) -> AuthResponse {
    AuthResponse {
        access_token: access.token,
        refresh_token: refresh.token,
        user_info: UserInfo::new(user, grants),
        expires_in: access.expires_at,
        status: "success".into(),
        message: message.into(),
    }
}
