//! Public store pages and checkout. No identity required.

use chrono::{DateTime, Utc};
use shared::{
    cart::{Cart, CartEntry},
    checkout::{checkout_link, contact_link},
    domain::{ItemKind, StoreProfile},
    error::{ApiError, ErrorCode},
    protocol::{CheckoutRequest, CheckoutResponse, PublicStorePage},
    validation::{ValidationError, MAX_LINE_QUANTITY},
};
use tracing::{info, warn};

use crate::{catalog::ITEM_NOT_FOUND, internal, stores::STORE_NOT_FOUND, ApiContext};

pub async fn public_store(
    ctx: &ApiContext,
    slug: &str,
    now: DateTime<Utc>,
) -> Result<PublicStorePage, ApiError> {
    let store = active_store(ctx, slug).await?;
    let items = ctx
        .storage
        .list_items(store.store_id)
        .await
        .map_err(internal)?
        .into_iter()
        .filter(|item| item.is_active)
        .collect();

    let contact_link = match contact_link(&ctx.messaging_host, &store.whatsapp) {
        Ok(link) => Some(link),
        Err(error) => {
            warn!(store_id = %store.store_id, %error, "store has no usable whatsapp number");
            None
        }
    };
    Ok(PublicStorePage {
        is_open: store.schedule.is_open(now),
        schedule_label: store.schedule.describe(),
        contact_link,
        items,
        store,
    })
}

/// Rebuilds the cart from catalog prices, records a pending order and hands
/// back the message and deep link for the store's WhatsApp.
pub async fn checkout(
    ctx: &ApiContext,
    slug: &str,
    req: CheckoutRequest,
) -> Result<CheckoutResponse, ApiError> {
    let store = active_store(ctx, slug).await?;
    if req.customer.name.trim().is_empty() {
        return Err(ValidationError::new("customer", "El nombre es requerido").into());
    }

    let mut cart = Cart::new();
    for line in &req.lines {
        if line.quantity == 0 {
            continue;
        }
        let item = ctx
            .storage
            .item_by_id(line.item_id)
            .await
            .map_err(internal)?
            .filter(|item| item.store_id == store.store_id && item.is_active)
            .ok_or_else(|| ApiError::not_found(ITEM_NOT_FOUND))?;

        let quantity = cart
            .line(item.item_id)
            .map_or(0, |l| l.quantity)
            .checked_add(line.quantity)
            .filter(|quantity| *quantity <= MAX_LINE_QUANTITY)
            .ok_or_else(|| {
                ValidationError::new("lines", format!("Cantidad no válida para {}", item.name))
            })?;
        if let (ItemKind::Product, Some(stock)) = (item.kind, item.stock) {
            if quantity > stock {
                return Err(ValidationError::new(
                    "lines",
                    format!("Stock insuficiente para {}", item.name),
                )
                .into());
            }
        }
        cart.add_item(CartEntry::from(&item));
        cart.update_quantity(item.item_id, quantity);
    }

    let notes = req.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let link = checkout_link(&ctx.messaging_host, &store.whatsapp, &cart, notes)
        .map_err(|e| ApiError::new(ErrorCode::Validation, e.to_string()))?;
    let message = cart.format_checkout_message(notes);

    let total = cart.total();
    let order_id = ctx
        .storage
        .create_order(store.store_id, &req.customer, &cart.to_order_lines(), total, notes)
        .await
        .map_err(internal)?;
    info!(store_id = %store.store_id, %order_id, items = cart.item_count(), "checkout recorded");

    Ok(CheckoutResponse {
        order_id,
        total,
        message,
        link,
    })
}

/// Inactive stores are indistinguishable from unknown slugs.
async fn active_store(ctx: &ApiContext, slug: &str) -> Result<StoreProfile, ApiError> {
    ctx.storage
        .store_by_slug(slug)
        .await
        .map_err(internal)?
        .filter(|store| store.status.is_active())
        .ok_or_else(|| ApiError::not_found(STORE_NOT_FOUND))
}

#[cfg(test)]
#[path = "tests/storefront_tests.rs"]
mod tests;
