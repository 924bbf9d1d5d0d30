use shared::{
    domain::{Identity, Role, UserId, UserSummary, FALLBACK_CATEGORY},
    error::ApiError,
    protocol::{SettingsField, SettingsView, UserDraft, UserField, UserStats},
    schedule::WeeklySchedule,
    validation::{validate_full_name, validate_password, validate_store_name, validate_whatsapp},
};
use storage::{NewStore, NewUser};
use tracing::info;

use crate::{
    auth::{
        account_insert_error, authorize, ensure_whatsapp_available, hash_password, load_user,
        ADMIN_ONLY, ANY_ROLE,
    },
    internal, ApiContext,
};

pub async fn list_users(ctx: &ApiContext, identity: &Identity) -> Result<Vec<UserSummary>, ApiError> {
    authorize(identity, ADMIN_ONLY)?;
    ctx.storage.list_users().await.map_err(internal)
}

pub async fn user_stats(ctx: &ApiContext, identity: &Identity) -> Result<UserStats, ApiError> {
    let users = list_users(ctx, identity).await?;
    Ok(UserStats {
        total: users.len() as u64,
        active: users.iter().filter(|u| u.status.is_active()).count() as u64,
        sellers: users.iter().filter(|u| u.role == Role::Seller).count() as u64,
    })
}

/// Admin-created sellers get a store right away, like self-registered ones.
pub async fn create_user(
    ctx: &ApiContext,
    identity: &Identity,
    draft: UserDraft,
) -> Result<UserSummary, ApiError> {
    authorize(identity, ADMIN_ONLY)?;
    validate_full_name(&draft.full_name)?;
    validate_whatsapp(&draft.whatsapp)?;
    validate_password(&draft.password)?;
    validate_store_name(&draft.store_name)?;
    ensure_whatsapp_available(ctx, &draft.whatsapp, None).await?;

    let password_hash = hash_password(&draft.password);
    let user = NewUser {
        full_name: &draft.full_name,
        email: &draft.email,
        whatsapp: &draft.whatsapp,
        password_hash: &password_hash,
        store_name: &draft.store_name,
        role: draft.role,
        status: draft.status,
    };
    let user_id = if draft.role == Role::Seller {
        let store = NewStore {
            name: &draft.store_name,
            whatsapp: &draft.whatsapp,
            email: &draft.email,
            category: FALLBACK_CATEGORY,
            business_type: Default::default(),
            schedule: WeeklySchedule::default(),
        };
        ctx.storage.create_seller(user, store).await.map(|(user_id, _)| user_id)
    } else {
        ctx.storage.create_user(user).await
    }
    .map_err(account_insert_error)?;
    info!(admin = %identity.user_id, %user_id, role = draft.role.as_str(), "created user");
    load_user(ctx, user_id).await
}

pub async fn update_user(
    ctx: &ApiContext,
    identity: &Identity,
    user_id: UserId,
    fields: Vec<UserField>,
) -> Result<UserSummary, ApiError> {
    authorize(identity, ADMIN_ONLY)?;
    let mut user = load_user(ctx, user_id).await?;
    for field in &fields {
        field.validate()?;
        match field {
            UserField::Role(_) | UserField::Status(_) if user_id == identity.user_id => {
                return Err(ApiError::forbidden(
                    "No puede cambiar su propio rol o estado",
                ));
            }
            UserField::Whatsapp(phone) => {
                ensure_whatsapp_available(ctx, phone, Some(user_id)).await?;
            }
            _ => {}
        }
    }
    for field in fields {
        field.apply(&mut user);
    }
    save(ctx, &user).await?;
    info!(admin = %identity.user_id, %user_id, "updated user");
    Ok(user)
}

pub async fn get_settings(ctx: &ApiContext, identity: &Identity) -> Result<SettingsView, ApiError> {
    authorize(identity, ANY_ROLE)?;
    let user = load_user(ctx, identity.user_id).await?;
    Ok(SettingsView::from(&user))
}

pub async fn update_settings(
    ctx: &ApiContext,
    identity: &Identity,
    fields: Vec<SettingsField>,
) -> Result<SettingsView, ApiError> {
    authorize(identity, ANY_ROLE)?;
    let mut user = load_user(ctx, identity.user_id).await?;
    for field in &fields {
        field.validate()?;
        if let SettingsField::Whatsapp(phone) = field {
            ensure_whatsapp_available(ctx, phone, Some(identity.user_id)).await?;
        }
    }
    for field in fields {
        field.apply(&mut user);
    }
    save(ctx, &user).await?;
    Ok(SettingsView::from(&user))
}

async fn save(ctx: &ApiContext, user: &UserSummary) -> Result<(), ApiError> {
    let saved = ctx.storage.save_user(user).await.map_err(internal)?;
    if saved {
        Ok(())
    } else {
        Err(ApiError::not_found("Usuario no encontrado"))
    }
}

#[cfg(test)]
#[path = "tests/users_tests.rs"]
mod tests;
