use std::collections::BTreeSet;

use shared::{
    domain::{CatalogItem, Identity, ItemId, ItemKind},
    error::ApiError,
    protocol::{CatalogStats, ItemDraft, ItemField, ItemFilter},
    validation::validate_item,
};
use tracing::info;

use crate::{
    auth::{authorize, SELLER_ONLY},
    internal,
    stores::owned_store,
    ApiContext,
};

pub const ITEM_NOT_FOUND: &str = "Producto no encontrado";

pub async fn list_my_items(
    ctx: &ApiContext,
    identity: &Identity,
    filter: &ItemFilter,
) -> Result<Vec<CatalogItem>, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    let store = owned_store(ctx, identity).await?;
    let items = ctx.storage.list_items(store.store_id).await.map_err(internal)?;
    Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
}

pub async fn create_item(
    ctx: &ApiContext,
    identity: &Identity,
    mut draft: ItemDraft,
) -> Result<CatalogItem, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    validate_item(&draft)?;
    normalize_kind(draft.kind, &mut draft.stock, &mut draft.duration);

    let store = owned_store(ctx, identity).await?;
    let item_id = ctx
        .storage
        .create_item(store.store_id, &draft)
        .await
        .map_err(internal)?;
    info!(store_id = %store.store_id, %item_id, kind = draft.kind.as_str(), "created catalog item");
    load_item(ctx, item_id).await
}

pub async fn update_item(
    ctx: &ApiContext,
    identity: &Identity,
    item_id: ItemId,
    fields: Vec<ItemField>,
) -> Result<CatalogItem, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    let mut item = owned_item(ctx, identity, item_id).await?;
    for field in &fields {
        field.validate()?;
    }
    for field in fields {
        field.apply(&mut item);
    }
    normalize_kind(item.kind, &mut item.stock, &mut item.duration);

    if !ctx.storage.save_item(&item).await.map_err(internal)? {
        return Err(ApiError::not_found(ITEM_NOT_FOUND));
    }
    Ok(item)
}

pub async fn delete_item(ctx: &ApiContext, identity: &Identity, item_id: ItemId) -> Result<(), ApiError> {
    authorize(identity, SELLER_ONLY)?;
    owned_item(ctx, identity, item_id).await?;
    if !ctx.storage.delete_item(item_id).await.map_err(internal)? {
        return Err(ApiError::not_found(ITEM_NOT_FOUND));
    }
    info!(%item_id, "deleted catalog item");
    Ok(())
}

pub async fn catalog_stats(ctx: &ApiContext, identity: &Identity) -> Result<CatalogStats, ApiError> {
    let items = list_my_items(ctx, identity, &ItemFilter::default()).await?;
    Ok(stats_for(&items))
}

pub fn stats_for(items: &[CatalogItem]) -> CatalogStats {
    let count = |kind: ItemKind| items.iter().filter(|item| item.kind == kind).count() as u64;
    let categories: BTreeSet<&str> = items
        .iter()
        .map(|item| item.category.as_str())
        .filter(|category| !category.is_empty())
        .collect();
    CatalogStats {
        products: count(ItemKind::Product),
        services: count(ItemKind::Service),
        categories: categories.len() as u64,
    }
}

/// Stock is only tracked for products, duration only for services.
fn normalize_kind(kind: ItemKind, stock: &mut Option<u32>, duration: &mut Option<String>) {
    match kind {
        ItemKind::Product => *duration = None,
        ItemKind::Service => *stock = None,
    }
}

async fn load_item(ctx: &ApiContext, item_id: ItemId) -> Result<CatalogItem, ApiError> {
    ctx.storage
        .item_by_id(item_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(ITEM_NOT_FOUND))
}

/// Items of other stores look exactly like missing ones.
async fn owned_item(ctx: &ApiContext, identity: &Identity, item_id: ItemId) -> Result<CatalogItem, ApiError> {
    let store = owned_store(ctx, identity).await?;
    let item = load_item(ctx, item_id).await?;
    if item.store_id != store.store_id {
        return Err(ApiError::not_found(ITEM_NOT_FOUND));
    }
    Ok(item)
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
