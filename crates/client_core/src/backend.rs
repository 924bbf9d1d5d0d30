use async_trait::async_trait;
use shared::{
    domain::{
        CatalogItem, ItemId, Order, OrderId, OrderStatus, StoreId, StoreProfile, UserId,
        UserSummary,
    },
    protocol::{
        CheckoutRequest, CheckoutResponse, DashboardView, ItemDraft, ItemField, ItemFilter,
        LoginRequest, MenuEntry, OrderStats, PublicStorePage, RegisterRequest, SessionResponse,
        SettingsField, SettingsView, StoreField, UserDraft, UserField, UserStats,
    },
};

use crate::{error::Result, session::SessionContext};

/// Everything the dashboard and the public store pages read or write.
/// Authenticated calls take the session whose bearer token they send.
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<SessionResponse>;
    async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse>;
    async fn me(&self, session: &SessionContext) -> Result<UserSummary>;
    async fn menu(&self, session: &SessionContext) -> Result<Vec<MenuEntry>>;
    async fn dashboard(&self, session: &SessionContext) -> Result<DashboardView>;

    async fn settings(&self, session: &SessionContext) -> Result<SettingsView>;
    async fn update_settings(
        &self,
        session: &SessionContext,
        fields: &[SettingsField],
    ) -> Result<SettingsView>;

    async fn list_stores(&self, session: &SessionContext) -> Result<Vec<StoreProfile>>;
    async fn update_store(
        &self,
        session: &SessionContext,
        store_id: StoreId,
        fields: &[StoreField],
    ) -> Result<StoreProfile>;

    async fn list_users(&self, session: &SessionContext) -> Result<Vec<UserSummary>>;
    async fn user_stats(&self, session: &SessionContext) -> Result<UserStats>;
    async fn create_user(&self, session: &SessionContext, draft: &UserDraft) -> Result<UserSummary>;
    async fn update_user(
        &self,
        session: &SessionContext,
        user_id: UserId,
        fields: &[UserField],
    ) -> Result<UserSummary>;

    async fn my_store(&self, session: &SessionContext) -> Result<StoreProfile>;
    async fn update_my_store(
        &self,
        session: &SessionContext,
        fields: &[StoreField],
    ) -> Result<StoreProfile>;

    async fn list_items(
        &self,
        session: &SessionContext,
        filter: &ItemFilter,
    ) -> Result<Vec<CatalogItem>>;
    async fn create_item(&self, session: &SessionContext, draft: &ItemDraft) -> Result<CatalogItem>;
    async fn update_item(
        &self,
        session: &SessionContext,
        item_id: ItemId,
        fields: &[ItemField],
    ) -> Result<CatalogItem>;
    async fn delete_item(&self, session: &SessionContext, item_id: ItemId) -> Result<()>;

    async fn list_orders(
        &self,
        session: &SessionContext,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>>;
    async fn order_stats(&self, session: &SessionContext) -> Result<OrderStats>;
    async fn set_order_status(
        &self,
        session: &SessionContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order>;

    async fn public_store(&self, slug: &str) -> Result<PublicStorePage>;
    async fn checkout(&self, slug: &str, req: &CheckoutRequest) -> Result<CheckoutResponse>;
}
