use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::{
    domain::{
        ActiveStatus, BusinessType, CatalogItem, ItemId, ItemKind, NotificationPrefs,
        Order, OrderId, OrderStatus, Role, SocialLinks, StoreId, StoreProfile, UserId,
        UserSummary,
    },
    error::ApiError,
    protocol::{
        CatalogStats, CheckoutRequest, CheckoutResponse, DashboardView, ItemDraft, ItemField,
        ItemFilter, LoginRequest, MenuEntry, OrderStats, PublicStorePage, RegisterRequest,
        SessionResponse, SettingsField, SettingsView, StoreField, UserDraft, UserField, UserStats,
    },
    schedule::WeeklySchedule,
};
use tokio::sync::Mutex;

use crate::{
    backend::StorefrontBackend,
    error::{ClientError, Result},
    session::SessionContext,
};

pub(crate) const PASSWORD: &str = "Secreta123";
pub(crate) const ADMIN_WHATSAPP: &str = "+1234567890";
pub(crate) const SELLER_WHATSAPP: &str = "+1987654321";

pub(crate) fn store() -> StoreProfile {
    StoreProfile {
        store_id: StoreId(1),
        owner_user_id: UserId(2),
        owner_name: "María García".into(),
        name: "fashion-store".into(),
        slug: "fashion-store".into(),
        description: "Ropa y accesorios".into(),
        address: "Calle Principal 123".into(),
        whatsapp: SELLER_WHATSAPP.into(),
        email: "maria@tiendas.com".into(),
        category: "Moda y Accesorios".into(),
        business_type: BusinessType::Products,
        schedule: WeeklySchedule::default(),
        logo_url: None,
        social: SocialLinks::default(),
        status: ActiveStatus::Active,
        created_at: Utc::now(),
    }
}

pub(crate) fn item(id: i64, name: &str, price: Decimal, kind: ItemKind) -> CatalogItem {
    CatalogItem {
        item_id: ItemId(id),
        store_id: StoreId(1),
        name: name.into(),
        description: String::new(),
        unit_price: price,
        image_url: None,
        category: "Ropa".into(),
        kind,
        stock: (kind == ItemKind::Product).then_some(10),
        duration: (kind == ItemKind::Service).then(|| "2 horas".to_string()),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub(crate) fn page() -> PublicStorePage {
    PublicStorePage {
        store: store(),
        items: vec![
            item(1, "Camiseta Premium", Decimal::new(2999, 2), ItemKind::Product),
            item(2, "Asesoría de Imagen", Decimal::new(8999, 2), ItemKind::Service),
        ],
        is_open: true,
        schedule_label: "Lunes a Viernes: 09:00 - 18:00".into(),
        contact_link: None,
    }
}

fn user(whatsapp: &str) -> UserSummary {
    let role = if whatsapp == ADMIN_WHATSAPP {
        Role::Admin
    } else {
        Role::Seller
    };
    UserSummary {
        user_id: UserId(if role == Role::Admin { 1 } else { 2 }),
        full_name: "María García".into(),
        email: String::new(),
        whatsapp: whatsapp.into(),
        store_name: "fashion-store".into(),
        role,
        status: ActiveStatus::Active,
        notifications: NotificationPrefs::default(),
        registered_at: Utc::now(),
    }
}

fn session_for(user: &UserSummary) -> SessionResponse {
    SessionResponse {
        token: format!("token-{}", user.whatsapp),
        identity: user.identity(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

fn api<T>(error: ApiError) -> Result<T> {
    Err(ClientError::Api {
        status: error.http_status(),
        error,
    })
}

fn unsupported<T>() -> Result<T> {
    api(ApiError::not_found("no disponible en pruebas"))
}

/// In-memory backend. Tokens are `token-<whatsapp>`; the admin owns
/// [`ADMIN_WHATSAPP`].
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub(crate) page: Mutex<Option<PublicStorePage>>,
    pub(crate) checkouts: Mutex<Vec<CheckoutRequest>>,
    pub(crate) revoked: Mutex<bool>,
}

impl FakeBackend {
    pub(crate) fn with_page(page: PublicStorePage) -> Self {
        Self {
            page: Mutex::new(Some(page)),
            ..Self::default()
        }
    }

    async fn caller(&self, session: &SessionContext) -> Result<UserSummary> {
        let token = session.bearer()?;
        if *self.revoked.lock().await {
            return api(ApiError::unauthorized("Sesión inválida o expirada"));
        }
        match token.strip_prefix("token-") {
            Some(whatsapp) => Ok(user(whatsapp)),
            None => api(ApiError::unauthorized("Sesión inválida o expirada")),
        }
    }
}

#[async_trait]
impl StorefrontBackend for FakeBackend {
    async fn login(&self, req: &LoginRequest) -> Result<SessionResponse> {
        if req.password != PASSWORD {
            return api(ApiError::unauthorized("Contraseña incorrecta"));
        }
        Ok(session_for(&user(&req.whatsapp)))
    }

    async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse> {
        let mut user = user(&req.whatsapp);
        user.full_name = req.full_name.clone();
        user.store_name = req.store_name.clone();
        Ok(session_for(&user))
    }

    async fn me(&self, session: &SessionContext) -> Result<UserSummary> {
        self.caller(session).await
    }

    async fn menu(&self, _session: &SessionContext) -> Result<Vec<MenuEntry>> {
        unsupported()
    }

    async fn dashboard(&self, session: &SessionContext) -> Result<DashboardView> {
        let caller = self.caller(session).await?;
        Ok(DashboardView::Seller {
            store_name: caller.store_name,
            pending_orders: 1,
            month_revenue: Decimal::new(5998, 2),
            catalog: CatalogStats {
                products: 1,
                services: 1,
                categories: 1,
            },
        })
    }

    async fn settings(&self, session: &SessionContext) -> Result<SettingsView> {
        Ok(SettingsView::from(&self.caller(session).await?))
    }

    async fn update_settings(
        &self,
        _session: &SessionContext,
        _fields: &[SettingsField],
    ) -> Result<SettingsView> {
        unsupported()
    }

    async fn list_stores(&self, session: &SessionContext) -> Result<Vec<StoreProfile>> {
        if self.caller(session).await?.role != Role::Admin {
            return api(ApiError::forbidden("No tiene permisos para esta acción"));
        }
        Ok(vec![store()])
    }

    async fn update_store(
        &self,
        _session: &SessionContext,
        _store_id: StoreId,
        _fields: &[StoreField],
    ) -> Result<StoreProfile> {
        unsupported()
    }

    async fn list_users(&self, _session: &SessionContext) -> Result<Vec<UserSummary>> {
        unsupported()
    }

    async fn user_stats(&self, _session: &SessionContext) -> Result<UserStats> {
        unsupported()
    }

    async fn create_user(&self, _session: &SessionContext, _draft: &UserDraft) -> Result<UserSummary> {
        unsupported()
    }

    async fn update_user(
        &self,
        _session: &SessionContext,
        _user_id: UserId,
        _fields: &[UserField],
    ) -> Result<UserSummary> {
        unsupported()
    }

    async fn my_store(&self, session: &SessionContext) -> Result<StoreProfile> {
        self.caller(session).await?;
        Ok(store())
    }

    async fn update_my_store(
        &self,
        _session: &SessionContext,
        _fields: &[StoreField],
    ) -> Result<StoreProfile> {
        unsupported()
    }

    async fn list_items(
        &self,
        session: &SessionContext,
        filter: &ItemFilter,
    ) -> Result<Vec<CatalogItem>> {
        self.caller(session).await?;
        Ok(page()
            .items
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect())
    }

    async fn create_item(&self, _session: &SessionContext, _draft: &ItemDraft) -> Result<CatalogItem> {
        unsupported()
    }

    async fn update_item(
        &self,
        _session: &SessionContext,
        _item_id: ItemId,
        _fields: &[ItemField],
    ) -> Result<CatalogItem> {
        unsupported()
    }

    async fn delete_item(&self, _session: &SessionContext, _item_id: ItemId) -> Result<()> {
        unsupported()
    }

    async fn list_orders(
        &self,
        _session: &SessionContext,
        _status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        unsupported()
    }

    async fn order_stats(&self, _session: &SessionContext) -> Result<OrderStats> {
        unsupported()
    }

    async fn set_order_status(
        &self,
        _session: &SessionContext,
        _order_id: OrderId,
        _status: OrderStatus,
    ) -> Result<Order> {
        unsupported()
    }

    async fn public_store(&self, slug: &str) -> Result<PublicStorePage> {
        match self.page.lock().await.clone() {
            Some(page) if page.store.slug == slug => Ok(page),
            _ => api(ApiError::not_found("Tienda no encontrada")),
        }
    }

    async fn checkout(&self, slug: &str, req: &CheckoutRequest) -> Result<CheckoutResponse> {
        let page = self.public_store(slug).await?;
        let total: Decimal = req
            .lines
            .iter()
            .filter_map(|line| {
                page.items
                    .iter()
                    .find(|item| item.item_id == line.item_id)
                    .map(|item| item.unit_price * Decimal::from(line.quantity))
            })
            .sum();
        self.checkouts.lock().await.push(req.clone());
        Ok(CheckoutResponse {
            order_id: OrderId(7),
            total,
            message: String::new(),
            link: "https://wa.me/1987654321?text=pedido".to_string(),
        })
    }
}
