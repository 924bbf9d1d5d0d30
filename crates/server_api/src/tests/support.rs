use std::str::FromStr;

use rust_decimal::Decimal;
use shared::{
    domain::{ActiveStatus, Customer, Identity, ItemKind, Role},
    protocol::{ItemDraft, RegisterRequest},
};
use storage::{NewUser, Storage};

use crate::{
    auth::{hash_password, register},
    ApiContext, TokenConfig,
};

pub(crate) const PASSWORD: &str = "Secreta123";

pub(crate) async fn context() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext::new(
        storage,
        TokenConfig {
            issuer: "storefront-test".into(),
            secret: "devsecret".into(),
            ttl_seconds: 60,
        },
    )
}

pub(crate) async fn seller(ctx: &ApiContext, whatsapp: &str, store_name: &str) -> Identity {
    register(
        ctx,
        RegisterRequest {
            full_name: "María García".into(),
            whatsapp: whatsapp.into(),
            password: PASSWORD.into(),
            store_name: store_name.into(),
        },
    )
    .await
    .expect("register seller")
    .identity
}

pub(crate) async fn admin(ctx: &ApiContext) -> Identity {
    let user_id = ctx
        .storage
        .create_user(NewUser {
            full_name: "Admin Principal",
            email: "admin@tiendas.com",
            whatsapp: "+1234567890",
            password_hash: &hash_password(PASSWORD),
            store_name: "admin",
            role: Role::Admin,
            status: ActiveStatus::Active,
        })
        .await
        .expect("admin");
    ctx.storage
        .user_by_id(user_id)
        .await
        .expect("lookup")
        .expect("present")
        .summary
        .identity()
}

pub(crate) fn draft(name: &str, price: &str, kind: ItemKind, category: &str) -> ItemDraft {
    ItemDraft {
        name: name.into(),
        description: String::new(),
        unit_price: Decimal::from_str(price).expect("decimal"),
        image_url: None,
        category: category.into(),
        kind,
        stock: Some(5),
        duration: Some("1 hora".into()),
    }
}

pub(crate) fn customer() -> Customer {
    Customer {
        name: "Juan Pérez".into(),
        email: "juan@example.com".into(),
        phone: "+1234567890".into(),
        shipping_address: Some("Calle Principal 123, Ciudad".into()),
    }
}
