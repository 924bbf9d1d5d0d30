use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use shared::{
    access::is_authorized,
    domain::{ActiveStatus, BusinessType, Identity, Role, UserId, UserSummary, FALLBACK_CATEGORY},
    error::ApiError,
    protocol::{LoginRequest, MenuEntry, RegisterRequest, SessionResponse},
    schedule::WeeklySchedule,
    validation::{validate_login, validate_register},
};
use storage::{is_unique_violation, NewStore, NewUser};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    conflict, internal,
    token::{mint_session_token, verify_session_token},
    ApiContext,
};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const SELLER_ONLY: &[Role] = &[Role::Seller];
/// Any logged-in identity.
pub const ANY_ROLE: &[Role] = &[];

pub const DUPLICATE_WHATSAPP: &str = "Este número de WhatsApp ya está registrado";
pub const UNKNOWN_USER: &str = "Usuario no encontrado";
pub const WRONG_PASSWORD: &str = "Contraseña incorrecta";
pub const INACTIVE_USER: &str = "Usuario inactivo";

/// Salted SHA-256, stored as `salt$base64(digest)`.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = password_digest(&salt, password);
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    password_digest(salt, password) == expected
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), ApiError> {
    if is_authorized(Some(identity.role), allowed) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "{} no tiene acceso a esta sección",
            identity.role.label()
        )))
    }
}

/// Resolves a bearer token into the identity of an active user. The role in
/// the token must still match the stored one.
pub async fn authenticate(ctx: &ApiContext, bearer: &str) -> Result<Identity, ApiError> {
    let claims = verify_session_token(&ctx.tokens, bearer).map_err(|error| {
        warn!(%error, "rejected session token");
        ApiError::unauthorized("Sesión inválida o expirada")
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("Sesión inválida o expirada"))?;
    let user = load_user(ctx, user_id)
        .await
        .map_err(|_| ApiError::unauthorized("Sesión inválida o expirada"))?;
    if !user.status.is_active() {
        return Err(ApiError::forbidden(INACTIVE_USER));
    }
    if user.role != claims.role {
        return Err(ApiError::unauthorized("Sesión inválida o expirada"));
    }
    Ok(user.identity())
}

pub async fn register(ctx: &ApiContext, req: RegisterRequest) -> Result<SessionResponse, ApiError> {
    validate_register(&req)?;
    ensure_whatsapp_available(ctx, &req.whatsapp, None).await?;

    let (user_id, store_id) = ctx
        .storage
        .create_seller(
            NewUser {
                full_name: &req.full_name,
                email: "",
                whatsapp: &req.whatsapp,
                password_hash: &hash_password(&req.password),
                store_name: &req.store_name,
                role: Role::Seller,
                status: ActiveStatus::Active,
            },
            NewStore {
                name: &req.store_name,
                whatsapp: &req.whatsapp,
                email: "",
                category: FALLBACK_CATEGORY,
                business_type: BusinessType::default(),
                schedule: WeeklySchedule::default(),
            },
        )
        .await
        .map_err(account_insert_error)?;
    info!(%user_id, %store_id, "registered seller");

    let user = load_user(ctx, user_id).await?;
    issue_session(ctx, &user)
}

pub async fn login(ctx: &ApiContext, req: LoginRequest) -> Result<SessionResponse, ApiError> {
    validate_login(&req)?;
    let Some(stored) = ctx
        .storage
        .user_by_whatsapp(&req.whatsapp)
        .await
        .map_err(internal)?
    else {
        return Err(ApiError::unauthorized(UNKNOWN_USER));
    };
    if !verify_password(&req.password, &stored.password_hash) {
        warn!(user_id = %stored.summary.user_id, "login with wrong password");
        return Err(ApiError::unauthorized(WRONG_PASSWORD));
    }
    if !stored.summary.status.is_active() {
        return Err(ApiError::forbidden(INACTIVE_USER));
    }
    info!(user_id = %stored.summary.user_id, role = stored.summary.role.as_str(), "login");
    issue_session(ctx, &stored.summary)
}

pub async fn me(ctx: &ApiContext, identity: &Identity) -> Result<UserSummary, ApiError> {
    load_user(ctx, identity.user_id).await
}

/// Sidebar entries visible to `role`; empty for anonymous callers.
pub fn menu(ctx: &ApiContext, role: Option<Role>) -> Vec<MenuEntry> {
    ctx.policy
        .menu_for(role)
        .into_iter()
        .map(MenuEntry::from)
        .collect()
}

fn issue_session(ctx: &ApiContext, user: &UserSummary) -> Result<SessionResponse, ApiError> {
    let (token, expires_at) = mint_session_token(&ctx.tokens, user.user_id, user.role)
        .map_err(|e| internal(anyhow::anyhow!("token mint failed: {e}")))?;
    Ok(SessionResponse {
        token,
        identity: user.identity(),
        expires_at,
    })
}

pub(crate) async fn load_user(ctx: &ApiContext, user_id: UserId) -> Result<UserSummary, ApiError> {
    ctx.storage
        .user_by_id(user_id)
        .await
        .map_err(internal)?
        .map(|stored| stored.summary)
        .ok_or_else(|| ApiError::not_found(UNKNOWN_USER))
}

/// `except` lets a user keep their own number on edit.
/// A concurrent registration can still hit the UNIQUE index after
/// [`ensure_whatsapp_available`] passed.
pub(crate) fn account_insert_error(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        conflict(DUPLICATE_WHATSAPP)
    } else {
        internal(err)
    }
}

pub(crate) async fn ensure_whatsapp_available(
    ctx: &ApiContext,
    whatsapp: &str,
    except: Option<UserId>,
) -> Result<(), ApiError> {
    let existing = ctx
        .storage
        .user_by_whatsapp(whatsapp)
        .await
        .map_err(internal)?;
    match existing {
        Some(stored) if Some(stored.summary.user_id) != except => Err(conflict(DUPLICATE_WHATSAPP)),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
