use std::sync::Arc;

use chrono::Utc;
use shared::{
    access::{AccessPolicy, MenuItem, Navigation},
    domain::{
        CatalogItem, Identity, ItemId, Order, OrderId, OrderStatus, StoreId, StoreProfile, UserId,
        UserSummary,
    },
    protocol::{
        DashboardView, ItemDraft, ItemField, ItemFilter, LoginRequest, OrderStats,
        RegisterRequest, SettingsField, SettingsView, StoreField, UserDraft, UserField, UserStats,
    },
    validation::{validate_login, validate_register},
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{backend::StorefrontBackend, error::Result, session::SessionContext};

/// The dashboard's view of the backend: one session, gated navigation and a
/// wrapper per screen action. A call the server rejects for a missing or
/// wrong session drops the local session so the next navigation lands on
/// the login page.
pub struct StorefrontClient {
    backend: Arc<dyn StorefrontBackend>,
    policy: AccessPolicy,
    session: RwLock<SessionContext>,
}

impl StorefrontClient {
    pub fn new(backend: Arc<dyn StorefrontBackend>) -> Arc<Self> {
        Self::with_policy(backend, AccessPolicy::default())
    }

    pub fn with_policy(backend: Arc<dyn StorefrontBackend>, policy: AccessPolicy) -> Arc<Self> {
        Arc::new(Self {
            backend,
            policy,
            session: RwLock::new(SessionContext::anonymous()),
        })
    }

    pub async fn session(&self) -> SessionContext {
        self.session.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.session.read().await.identity().cloned()
    }

    pub async fn login(&self, whatsapp: &str, password: &str) -> Result<Identity> {
        let req = LoginRequest {
            whatsapp: whatsapp.trim().to_string(),
            password: password.to_string(),
        };
        validate_login(&req)?;
        let response = self.backend.login(&req).await?;
        let identity = response.identity.clone();
        *self.session.write().await = SessionContext::from(response);
        info!(user_id = %identity.user_id, role = identity.role.as_str(), "logged in");
        Ok(identity)
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Identity> {
        validate_register(&req)?;
        let response = self.backend.register(&req).await?;
        let identity = response.identity.clone();
        *self.session.write().await = SessionContext::from(response);
        info!(user_id = %identity.user_id, store = %identity.store_name, "registered seller");
        Ok(identity)
    }

    pub async fn logout(&self) {
        self.session.write().await.clear();
    }

    /// Where `path` leads for the current session. An expired token counts
    /// as logged out.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let role = {
            let mut session = self.session.write().await;
            if session.is_expired(Utc::now()) {
                info!("session expired");
                session.clear();
            }
            session.role()
        };
        self.policy.check(role, path)
    }

    pub async fn sidebar(&self) -> Vec<MenuItem> {
        let role = self.session.read().await.role();
        self.policy.menu_for(role)
    }

    /// Reloads the identity from the server, picking up profile edits made
    /// elsewhere.
    pub async fn refresh_identity(&self) -> Result<Identity> {
        let session = self.session().await;
        let user = self.guard(&session, self.backend.me(&session).await).await?;
        Ok(user.identity())
    }

    pub async fn dashboard(&self) -> Result<DashboardView> {
        let session = self.session().await;
        self.guard(&session, self.backend.dashboard(&session).await).await
    }

    pub async fn settings(&self) -> Result<SettingsView> {
        let session = self.session().await;
        self.guard(&session, self.backend.settings(&session).await).await
    }

    pub async fn update_settings(&self, fields: &[SettingsField]) -> Result<SettingsView> {
        let session = self.session().await;
        self.guard(&session, self.backend.update_settings(&session, fields).await)
            .await
    }

    pub async fn stores(&self) -> Result<Vec<StoreProfile>> {
        let session = self.session().await;
        self.guard(&session, self.backend.list_stores(&session).await).await
    }

    pub async fn update_store(
        &self,
        store_id: StoreId,
        fields: &[StoreField],
    ) -> Result<StoreProfile> {
        let session = self.session().await;
        self.guard(&session, self.backend.update_store(&session, store_id, fields).await)
            .await
    }

    pub async fn users(&self) -> Result<Vec<UserSummary>> {
        let session = self.session().await;
        self.guard(&session, self.backend.list_users(&session).await).await
    }

    pub async fn user_stats(&self) -> Result<UserStats> {
        let session = self.session().await;
        self.guard(&session, self.backend.user_stats(&session).await).await
    }

    pub async fn create_user(&self, draft: &UserDraft) -> Result<UserSummary> {
        let session = self.session().await;
        self.guard(&session, self.backend.create_user(&session, draft).await)
            .await
    }

    pub async fn update_user(&self, user_id: UserId, fields: &[UserField]) -> Result<UserSummary> {
        let session = self.session().await;
        self.guard(&session, self.backend.update_user(&session, user_id, fields).await)
            .await
    }

    pub async fn my_store(&self) -> Result<StoreProfile> {
        let session = self.session().await;
        self.guard(&session, self.backend.my_store(&session).await).await
    }

    pub async fn update_my_store(&self, fields: &[StoreField]) -> Result<StoreProfile> {
        let session = self.session().await;
        self.guard(&session, self.backend.update_my_store(&session, fields).await)
            .await
    }

    pub async fn items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>> {
        let session = self.session().await;
        self.guard(&session, self.backend.list_items(&session, filter).await)
            .await
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        let session = self.session().await;
        self.guard(&session, self.backend.create_item(&session, draft).await)
            .await
    }

    pub async fn update_item(&self, item_id: ItemId, fields: &[ItemField]) -> Result<CatalogItem> {
        let session = self.session().await;
        self.guard(&session, self.backend.update_item(&session, item_id, fields).await)
            .await
    }

    pub async fn delete_item(&self, item_id: ItemId) -> Result<()> {
        let session = self.session().await;
        self.guard(&session, self.backend.delete_item(&session, item_id).await)
            .await
    }

    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let session = self.session().await;
        self.guard(&session, self.backend.list_orders(&session, status).await)
            .await
    }

    pub async fn order_stats(&self) -> Result<OrderStats> {
        let session = self.session().await;
        self.guard(&session, self.backend.order_stats(&session).await).await
    }

    pub async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let session = self.session().await;
        self.guard(&session, self.backend.set_order_status(&session, order_id, status).await)
            .await
    }

    /// Drops the session that `sent` carried when the server rejected it. A
    /// newer login that finished while the call was in flight is kept.
    async fn guard<T>(&self, sent: &SessionContext, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.requires_login() {
                let mut session = self.session.write().await;
                if session.bearer().ok() == sent.bearer().ok() {
                    warn!(error = %err, "dropping session");
                    session.clear();
                }
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
