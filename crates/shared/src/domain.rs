use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schedule::WeeklySchedule;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(StoreId);
id_newtype!(ItemId);
id_newtype!(OrderId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Seller,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Seller => "Vendedor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Service,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Service => "service",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "product" => Some(ItemKind::Product),
            "service" => Some(ItemKind::Service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    #[default]
    Products,
    Services,
}

impl BusinessType {
    pub fn as_str(self) -> &'static str {
        match self {
            BusinessType::Products => "products",
            BusinessType::Services => "services",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "products" => Some(BusinessType::Products),
            "services" => Some(BusinessType::Services),
            _ => None,
        }
    }
}

/// Shared by users and stores: an inactive account keeps its data but is
/// hidden from login and from the public storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

impl ActiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveStatus::Active => "active",
            ActiveStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(ActiveStatus::Active),
            "inactive" => Some(ActiveStatus::Inactive),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        self == ActiveStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Processing => "En proceso",
            OrderStatus::Completed => "Completado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

pub const STORE_CATEGORIES: [&str; 23] = [
    "Ropa y Accesorios",
    "Electrónica",
    "Alimentos y Bebidas",
    "Frutas y Verduras",
    "Carnicería",
    "Panadería",
    "Servicios Profesionales",
    "Belleza y Cuidado Personal",
    "Hogar y Decoración",
    "Deportes",
    "Juguetes",
    "Mascotas",
    "Libros y Papelería",
    "Artesanías",
    "Joyería",
    "Ferretería",
    "Farmacia",
    "Servicios de Salud",
    "Servicios Educativos",
    "Servicios de Limpieza",
    "Servicios de Transporte",
    "Servicios de Mantenimiento",
    "Otros",
];

pub const FALLBACK_CATEGORY: &str = "Otros";

pub fn is_store_category(category: &str) -> bool {
    STORE_CATEGORIES.contains(&category)
}

/// Public URL segment for a store: lowercased, whitespace runs collapsed to `-`.
pub fn store_slug(store_name: &str) -> String {
    store_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// The authenticated principal carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub full_name: String,
    pub whatsapp: String,
    pub store_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub email: bool,
    pub whatsapp: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            whatsapp: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub store_name: String,
    pub role: Role,
    pub status: ActiveStatus,
    pub notifications: NotificationPrefs,
    pub registered_at: DateTime<Utc>,
}

impl UserSummary {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            full_name: self.full_name.clone(),
            whatsapp: self.whatsapp.clone(),
            store_name: self.store_name.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub store_id: StoreId,
    pub owner_user_id: UserId,
    pub owner_name: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub address: String,
    pub whatsapp: String,
    pub email: String,
    pub category: String,
    pub business_type: BusinessType,
    pub schedule: WeeklySchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub social: SocialLinks,
    pub status: ActiveStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: ItemId,
    pub store_id: StoreId,
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category: String,
    pub kind: ItemKind,
    /// Units on hand; only tracked for products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Free-text length of a service session, e.g. "2 horas".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub store_id: StoreId,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
