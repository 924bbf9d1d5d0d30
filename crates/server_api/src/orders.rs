use rust_decimal::Decimal;
use shared::{
    domain::{Identity, Order, OrderId, OrderStatus},
    error::ApiError,
    protocol::OrderStats,
};
use tracing::info;

use crate::{
    auth::{authorize, SELLER_ONLY},
    internal,
    stores::owned_store,
    ApiContext,
};

pub const ORDER_NOT_FOUND: &str = "Pedido no encontrado";

/// Newest first, optionally narrowed to one status.
pub async fn list_my_orders(
    ctx: &ApiContext,
    identity: &Identity,
    status: Option<OrderStatus>,
) -> Result<Vec<Order>, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    let store = owned_store(ctx, identity).await?;
    let orders = ctx.storage.list_orders(store.store_id).await.map_err(internal)?;
    Ok(orders
        .into_iter()
        .filter(|order| status.map_or(true, |status| order.status == status))
        .collect())
}

pub async fn order_stats(ctx: &ApiContext, identity: &Identity) -> Result<OrderStats, ApiError> {
    let orders = list_my_orders(ctx, identity, None).await?;
    Ok(stats_for(&orders))
}

/// Revenue only counts completed orders.
pub fn stats_for(orders: &[Order]) -> OrderStats {
    OrderStats {
        total: orders.len() as u64,
        pending: orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .count() as u64,
        revenue: completed_revenue(orders.iter()),
    }
}

pub(crate) fn completed_revenue<'a>(orders: impl Iterator<Item = &'a Order>) -> Decimal {
    orders
        .filter(|order| order.status == OrderStatus::Completed)
        .map(|order| order.total)
        .sum()
}

pub async fn set_order_status(
    ctx: &ApiContext,
    identity: &Identity,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<Order, ApiError> {
    authorize(identity, SELLER_ONLY)?;
    let store = owned_store(ctx, identity).await?;
    let order = ctx
        .storage
        .order_by_id(order_id)
        .await
        .map_err(internal)?
        .filter(|order| order.store_id == store.store_id)
        .ok_or_else(|| ApiError::not_found(ORDER_NOT_FOUND))?;

    ctx.storage
        .set_order_status(order_id, status)
        .await
        .map_err(internal)?;
    info!(%order_id, from = order.status.as_str(), to = status.as_str(), "order status changed");
    Ok(Order { status, ..order })
}

#[cfg(test)]
#[path = "tests/orders_tests.rs"]
mod tests;
