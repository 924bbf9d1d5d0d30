use shared::{
    domain::{Identity, StoreId, StoreProfile},
    error::ApiError,
    protocol::StoreField,
};
use tracing::info;

use crate::{
    auth::{authorize, ADMIN_ONLY, SELLER_ONLY},
    internal, ApiContext,
};

pub const STORE_NOT_FOUND: &str = "Tienda no encontrada";

pub async fn list_stores(ctx: &ApiContext, identity: &Identity) -> Result<Vec<StoreProfile>, ApiError> {
    authorize(identity, ADMIN_ONLY)?;
    ctx.storage.list_stores().await.map_err(internal)
}

pub async fn update_store(
    ctx: &ApiContext,
    identity: &Identity,
    store_id: StoreId,
    fields: Vec<StoreField>,
) -> Result<StoreProfile, ApiError> {
    authorize(identity, ADMIN_ONLY)?;
    let store = ctx
        .storage
        .store_by_id(store_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(STORE_NOT_FOUND))?;
    let store = apply_fields(ctx, store, fields).await?;
    info!(admin = %identity.user_id, %store_id, status = store.status.as_str(), "updated store");
    Ok(store)
}

pub async fn my_store(ctx: &ApiContext, identity: &Identity) -> Result<StoreProfile, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    owned_store(ctx, identity).await
}

pub async fn update_my_store(
    ctx: &ApiContext,
    identity: &Identity,
    fields: Vec<StoreField>,
) -> Result<StoreProfile, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    if fields.iter().any(StoreField::is_admin_only) {
        return Err(ApiError::forbidden(
            "Solo un administrador puede cambiar el estado de la tienda",
        ));
    }
    let store = owned_store(ctx, identity).await?;
    apply_fields(ctx, store, fields).await
}

/// The seller's own store. Callers have already checked the role.
pub(crate) async fn owned_store(ctx: &ApiContext, identity: &Identity) -> Result<StoreProfile, ApiError> {
    ctx.storage
        .store_for_owner(identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(STORE_NOT_FOUND))
}

async fn apply_fields(
    ctx: &ApiContext,
    mut store: StoreProfile,
    fields: Vec<StoreField>,
) -> Result<StoreProfile, ApiError> {
    for field in &fields {
        field.validate()?;
    }
    for field in fields {
        field.apply(&mut store);
    }
    if !ctx.storage.save_store(&store).await.map_err(internal)? {
        return Err(ApiError::not_found(STORE_NOT_FOUND));
    }
    // Reload: the slug may have been deduplicated on save.
    ctx.storage
        .store_by_id(store.store_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(STORE_NOT_FOUND))
}

#[cfg(test)]
#[path = "tests/stores_tests.rs"]
mod tests;
