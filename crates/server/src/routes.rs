use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use server_api::{auth, catalog, dashboard, orders, stores, storefront, users};
use shared::{
    domain::{
        CatalogItem, ItemId, Order, OrderId, OrderStatus, StoreId, StoreProfile, UserId,
        UserSummary,
    },
    protocol::{
        CheckoutRequest, CheckoutResponse, DashboardView, ItemDraft, ItemField, ItemFilter,
        LoginRequest, MenuEntry, OrderStats, OrderStatusUpdate, PublicStorePage, RegisterRequest,
        SessionResponse, SettingsField, SettingsView, StoreField, UserDraft, UserField, UserStats,
    },
};
use tracing::warn;

use crate::{
    app_state::AppState,
    session::{reject, AuthSession, HttpError},
};

type Shared = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersQuery {
    #[serde(default)]
    status: Option<OrderStatus>,
}

pub(crate) async fn healthz(State(state): Shared) -> Result<&'static str, StatusCode> {
    match state.api.storage.health_check().await {
        Ok(()) => Ok("ok"),
        Err(error) => {
            warn!(%error, "health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub(crate) async fn login(
    State(state): Shared,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    auth::login(&state.api, req).await.map(Json).map_err(reject)
}

pub(crate) async fn register(
    State(state): Shared,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), HttpError> {
    let session = auth::register(&state.api, req).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub(crate) async fn me(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<UserSummary>, HttpError> {
    auth::me(&state.api, &identity).await.map(Json).map_err(reject)
}

pub(crate) async fn menu(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Json<Vec<MenuEntry>> {
    Json(auth::menu(&state.api, Some(identity.role)))
}

pub(crate) async fn dashboard_view(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<DashboardView>, HttpError> {
    dashboard::dashboard(&state.api, &identity, Utc::now())
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn get_settings(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<SettingsView>, HttpError> {
    users::get_settings(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn update_settings(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Json(fields): Json<Vec<SettingsField>>,
) -> Result<Json<SettingsView>, HttpError> {
    users::update_settings(&state.api, &identity, fields)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn list_stores(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<Vec<StoreProfile>>, HttpError> {
    stores::list_stores(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn update_store(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Path(store_id): Path<i64>,
    Json(fields): Json<Vec<StoreField>>,
) -> Result<Json<StoreProfile>, HttpError> {
    stores::update_store(&state.api, &identity, StoreId(store_id), fields)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn list_users(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<Vec<UserSummary>>, HttpError> {
    users::list_users(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn user_stats(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<UserStats>, HttpError> {
    users::user_stats(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn create_user(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Json(draft): Json<UserDraft>,
) -> Result<(StatusCode, Json<UserSummary>), HttpError> {
    let user = users::create_user(&state.api, &identity, draft)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn update_user(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Path(user_id): Path<i64>,
    Json(fields): Json<Vec<UserField>>,
) -> Result<Json<UserSummary>, HttpError> {
    users::update_user(&state.api, &identity, UserId(user_id), fields)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn my_store(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<StoreProfile>, HttpError> {
    stores::my_store(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn update_my_store(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Json(fields): Json<Vec<StoreField>>,
) -> Result<Json<StoreProfile>, HttpError> {
    stores::update_my_store(&state.api, &identity, fields)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn list_items(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<Vec<CatalogItem>>, HttpError> {
    catalog::list_my_items(&state.api, &identity, &filter)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn create_item(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Json(draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<CatalogItem>), HttpError> {
    let item = catalog::create_item(&state.api, &identity, draft)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn update_item(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Path(item_id): Path<i64>,
    Json(fields): Json<Vec<ItemField>>,
) -> Result<Json<CatalogItem>, HttpError> {
    catalog::update_item(&state.api, &identity, ItemId(item_id), fields)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn delete_item(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    catalog::delete_item(&state.api, &identity, ItemId(item_id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_orders(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Query(q): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, HttpError> {
    orders::list_my_orders(&state.api, &identity, q.status)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn order_stats(
    State(state): Shared,
    AuthSession(identity): AuthSession,
) -> Result<Json<OrderStats>, HttpError> {
    orders::order_stats(&state.api, &identity)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn set_order_status(
    State(state): Shared,
    AuthSession(identity): AuthSession,
    Path(order_id): Path<i64>,
    Json(update): Json<OrderStatusUpdate>,
) -> Result<Json<Order>, HttpError> {
    orders::set_order_status(&state.api, &identity, OrderId(order_id), update.status)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn public_store(
    State(state): Shared,
    Path(slug): Path<String>,
) -> Result<Json<PublicStorePage>, HttpError> {
    storefront::public_store(&state.api, &slug, Utc::now())
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn checkout(
    State(state): Shared,
    Path(slug): Path<String>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), HttpError> {
    let response = storefront::checkout(&state.api, &slug, req)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(response)))
}
