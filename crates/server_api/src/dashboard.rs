use chrono::{DateTime, Datelike, Utc};
use shared::{
    domain::{Identity, Role},
    error::ApiError,
    protocol::DashboardView,
};

use crate::{
    auth::{authorize, ANY_ROLE},
    catalog, internal,
    orders::{self, completed_revenue},
    stores::owned_store,
    ApiContext,
};

pub const RECENT_STORES: usize = 5;

/// The admin overview or the seller's store summary, depending on the role.
pub async fn dashboard(
    ctx: &ApiContext,
    identity: &Identity,
    now: DateTime<Utc>,
) -> Result<DashboardView, ApiError> {
    authorize(identity, ANY_ROLE)?;
    match identity.role {
        Role::Admin => admin_view(ctx).await,
        Role::Seller => seller_view(ctx, identity, now).await,
    }
}

async fn admin_view(ctx: &ApiContext) -> Result<DashboardView, ApiError> {
    let stores = ctx.storage.list_stores().await.map_err(internal)?;
    let users = ctx.storage.list_users().await.map_err(internal)?;
    let total_revenue = ctx.storage.completed_revenue().await.map_err(internal)?;
    Ok(DashboardView::Admin {
        total_stores: stores.len() as u64,
        active_users: users.iter().filter(|u| u.status.is_active()).count() as u64,
        total_revenue,
        recent_stores: stores.into_iter().take(RECENT_STORES).collect(),
    })
}

async fn seller_view(
    ctx: &ApiContext,
    identity: &Identity,
    now: DateTime<Utc>,
) -> Result<DashboardView, ApiError> {
    let store = owned_store(ctx, identity).await?;
    let store_orders = ctx.storage.list_orders(store.store_id).await.map_err(internal)?;
    let items = ctx.storage.list_items(store.store_id).await.map_err(internal)?;

    let this_month = store_orders.iter().filter(|order| {
        order.created_at.year() == now.year() && order.created_at.month() == now.month()
    });
    Ok(DashboardView::Seller {
        pending_orders: orders::stats_for(&store_orders).pending,
        store_name: store.name,
        month_revenue: completed_revenue(this_month),
        catalog: catalog::stats_for(&items),
    })
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
