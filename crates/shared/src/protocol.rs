use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    access::MenuItem,
    domain::{
        store_slug, ActiveStatus, BusinessType, CatalogItem, Customer, Identity, ItemId, ItemKind,
        NotificationPrefs, OrderId, OrderStatus, Role, StoreProfile, UserSummary,
    },
    schedule::WeeklySchedule,
    validation::{
        validate_category, validate_full_name, validate_item_name, validate_store_name,
        validate_unit_price, validate_whatsapp, ValidationError,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub whatsapp: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub whatsapp: String,
    pub password: String,
    pub store_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    pub path: String,
}

impl From<MenuItem> for MenuEntry {
    fn from(item: MenuItem) -> Self {
        Self {
            label: item.label.to_string(),
            path: item.path.to_string(),
        }
    }
}

/// One edit to a store profile. Each variant names the field it replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum StoreField {
    Name(String),
    Description(String),
    Address(String),
    Whatsapp(String),
    Email(String),
    Category(String),
    BusinessType(BusinessType),
    Schedule(WeeklySchedule),
    LogoUrl(Option<String>),
    Facebook(Option<String>),
    Instagram(Option<String>),
    Status(ActiveStatus),
}

impl StoreField {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StoreField::Name(name) if name.trim().is_empty() => Err(ValidationError::new(
                "name",
                "El nombre de la tienda es requerido",
            )),
            StoreField::Whatsapp(phone) => validate_whatsapp(phone),
            StoreField::Category(category) => validate_category(category),
            _ => Ok(()),
        }
    }

    pub fn apply(self, store: &mut StoreProfile) {
        match self {
            StoreField::Name(name) => {
                store.slug = store_slug(&name);
                store.name = name;
            }
            StoreField::Description(description) => store.description = description,
            StoreField::Address(address) => store.address = address,
            StoreField::Whatsapp(whatsapp) => store.whatsapp = whatsapp,
            StoreField::Email(email) => store.email = email,
            StoreField::Category(category) => store.category = category,
            StoreField::BusinessType(business_type) => store.business_type = business_type,
            StoreField::Schedule(schedule) => store.schedule = schedule,
            StoreField::LogoUrl(logo_url) => store.logo_url = logo_url,
            StoreField::Facebook(url) => store.social.facebook = url,
            StoreField::Instagram(url) => store.social.instagram = url,
            StoreField::Status(status) => store.status = status,
        }
    }

    /// Sellers may edit their storefront but only admins toggle its status.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, StoreField::Status(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ItemField {
    Name(String),
    Description(String),
    UnitPrice(Decimal),
    ImageUrl(Option<String>),
    Category(String),
    Kind(ItemKind),
    Stock(Option<u32>),
    Duration(Option<String>),
    Active(bool),
}

impl ItemField {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ItemField::Name(name) => validate_item_name(name),
            ItemField::UnitPrice(price) => validate_unit_price(*price),
            _ => Ok(()),
        }
    }

    pub fn apply(self, item: &mut CatalogItem) {
        match self {
            ItemField::Name(name) => item.name = name,
            ItemField::Description(description) => item.description = description,
            ItemField::UnitPrice(price) => item.unit_price = price,
            ItemField::ImageUrl(url) => item.image_url = url,
            ItemField::Category(category) => item.category = category,
            ItemField::Kind(kind) => item.kind = kind,
            ItemField::Stock(stock) => item.stock = stock,
            ItemField::Duration(duration) => item.duration = duration,
            ItemField::Active(active) => item.is_active = active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub kind: Option<ItemKind>,
}

impl ItemFilter {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| item.category == category);
        let kind_ok = self.kind.map_or(true, |kind| item.kind == kind);
        category_ok && kind_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDraft {
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub whatsapp: String,
    pub store_name: String,
    pub role: Role,
    #[serde(default)]
    pub status: ActiveStatus,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum UserField {
    FullName(String),
    Email(String),
    Whatsapp(String),
    StoreName(String),
    Role(Role),
    Status(ActiveStatus),
}

impl UserField {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            UserField::FullName(name) => validate_full_name(name),
            UserField::Whatsapp(phone) => validate_whatsapp(phone),
            UserField::StoreName(name) => validate_store_name(name),
            UserField::Email(_) | UserField::Role(_) | UserField::Status(_) => Ok(()),
        }
    }

    pub fn apply(self, user: &mut UserSummary) {
        match self {
            UserField::FullName(name) => user.full_name = name,
            UserField::Email(email) => user.email = email,
            UserField::Whatsapp(phone) => user.whatsapp = phone,
            UserField::StoreName(name) => user.store_name = name,
            UserField::Role(role) => user.role = role,
            UserField::Status(status) => user.status = status,
        }
    }
}

/// Self-service edits from the settings page; role and status are not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SettingsField {
    FullName(String),
    Email(String),
    Whatsapp(String),
    StoreName(String),
    NotifyByEmail(bool),
    NotifyByWhatsapp(bool),
}

impl SettingsField {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            SettingsField::FullName(name) => validate_full_name(name),
            SettingsField::Whatsapp(phone) => validate_whatsapp(phone),
            SettingsField::StoreName(name) => validate_store_name(name),
            SettingsField::Email(_)
            | SettingsField::NotifyByEmail(_)
            | SettingsField::NotifyByWhatsapp(_) => Ok(()),
        }
    }

    pub fn apply(self, user: &mut UserSummary) {
        match self {
            SettingsField::FullName(name) => user.full_name = name,
            SettingsField::Email(email) => user.email = email,
            SettingsField::Whatsapp(phone) => user.whatsapp = phone,
            SettingsField::StoreName(name) => user.store_name = name,
            SettingsField::NotifyByEmail(on) => user.notifications.email = on,
            SettingsField::NotifyByWhatsapp(on) => user.notifications.whatsapp = on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub store_name: String,
    pub notifications: NotificationPrefs,
}

impl From<&UserSummary> for SettingsView {
    fn from(user: &UserSummary) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            whatsapp: user.whatsapp.clone(),
            store_name: user.store_name.clone(),
            notifications: user.notifications,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: u64,
    pub pending: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub sellers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub products: u64,
    pub services: u64,
    pub categories: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardView {
    Admin {
        total_stores: u64,
        active_users: u64,
        total_revenue: Decimal,
        recent_stores: Vec<StoreProfile>,
    },
    Seller {
        store_name: String,
        pending_orders: u64,
        month_revenue: Decimal,
        catalog: CatalogStats,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicStorePage {
    pub store: StoreProfile,
    pub items: Vec<CatalogItem>,
    pub is_open: bool,
    pub schedule_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: Customer,
    pub lines: Vec<CheckoutLine>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub total: Decimal,
    pub message: String,
    pub link: String,
}
