use super::*;
use crate::test_support::{admin, context, seller, PASSWORD};
use shared::error::ErrorCode;

fn login_request(whatsapp: &str, password: &str) -> LoginRequest {
    LoginRequest {
        whatsapp: whatsapp.into(),
        password: password.into(),
    }
}

#[test]
fn password_hashes_are_salted_and_verifiable() {
    let first = hash_password(PASSWORD);
    let second = hash_password(PASSWORD);
    assert_ne!(first, second);
    assert!(verify_password(PASSWORD, &first));
    assert!(verify_password(PASSWORD, &second));
    assert!(!verify_password("otra", &first));
    assert!(!verify_password(PASSWORD, "not-a-hash"));
}

#[tokio::test]
async fn register_creates_seller_with_store() {
    let ctx = context().await;
    let identity = seller(&ctx, "+1987654321", "fashion-store").await;
    assert_eq!(identity.role, Role::Seller);

    let store = ctx
        .storage
        .store_for_owner(identity.user_id)
        .await
        .expect("lookup")
        .expect("store");
    assert_eq!(store.slug, "fashion-store");
    assert_eq!(store.whatsapp, "+1987654321");
    assert_eq!(store.category, FALLBACK_CATEGORY);
}

#[tokio::test]
async fn register_rejects_duplicate_whatsapp_and_bad_fields() {
    let ctx = context().await;
    seller(&ctx, "+1987654321", "fashion-store").await;

    let duplicate = register(
        &ctx,
        RegisterRequest {
            full_name: "Otra Persona".into(),
            whatsapp: "+1987654321".into(),
            password: PASSWORD.into(),
            store_name: "otra-tienda".into(),
        },
    )
    .await
    .expect_err("duplicate");
    assert_eq!(duplicate.code, ErrorCode::Conflict);
    assert_eq!(duplicate.message, DUPLICATE_WHATSAPP);

    let weak = register(
        &ctx,
        RegisterRequest {
            full_name: "Otra Persona".into(),
            whatsapp: "+1555000111".into(),
            password: "corta".into(),
            store_name: "otra-tienda".into(),
        },
    )
    .await
    .expect_err("weak password");
    assert_eq!(weak.code, ErrorCode::Validation);
    assert_eq!(weak.field.as_deref(), Some("password"));
}

#[tokio::test]
async fn login_reports_unknown_user_wrong_password_and_inactive() {
    let ctx = context().await;
    let identity = seller(&ctx, "+1987654321", "fashion-store").await;

    let unknown = login(&ctx, login_request("+1555000111", PASSWORD))
        .await
        .expect_err("unknown");
    assert_eq!(unknown.code, ErrorCode::Unauthorized);
    assert_eq!(unknown.message, UNKNOWN_USER);

    let wrong = login(&ctx, login_request("+1987654321", "Incorrecta1"))
        .await
        .expect_err("wrong password");
    assert_eq!(wrong.message, WRONG_PASSWORD);

    let session = login(&ctx, login_request("+1987654321", PASSWORD))
        .await
        .expect("login");
    assert_eq!(session.identity.user_id, identity.user_id);

    let mut user = me(&ctx, &identity).await.expect("me");
    user.status = ActiveStatus::Inactive;
    ctx.storage.save_user(&user).await.expect("save");
    let inactive = login(&ctx, login_request("+1987654321", PASSWORD))
        .await
        .expect_err("inactive");
    assert_eq!(inactive.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn authenticate_resolves_bearer_tokens() {
    let ctx = context().await;
    seller(&ctx, "+1987654321", "fashion-store").await;
    let session = login(&ctx, login_request("+1987654321", PASSWORD))
        .await
        .expect("login");

    let identity = authenticate(&ctx, &session.token).await.expect("identity");
    assert_eq!(identity, session.identity);

    let err = authenticate(&ctx, "garbage").await.expect_err("bad token");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authorize_distinguishes_roles() {
    let ctx = context().await;
    let admin = admin(&ctx).await;
    let seller = seller(&ctx, "+1987654321", "fashion-store").await;

    assert!(authorize(&admin, ADMIN_ONLY).is_ok());
    assert!(authorize(&seller, ANY_ROLE).is_ok());
    let err = authorize(&seller, ADMIN_ONLY).expect_err("seller is not admin");
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn menu_follows_role() {
    let ctx = context().await;
    assert!(menu(&ctx, None).is_empty());

    let seller_paths: Vec<String> = menu(&ctx, Some(Role::Seller))
        .into_iter()
        .map(|entry| entry.path)
        .collect();
    assert_eq!(
        seller_paths,
        [
            "/dashboard/store",
            "/dashboard/products",
            "/dashboard/orders",
            "/dashboard/settings"
        ]
    );
    assert_eq!(menu(&ctx, Some(Role::Admin))[0].label, "Panel General");
}

#[tokio::test]
async fn racing_registrations_surface_as_conflicts() {
    let ctx = context().await;
    let first = NewUser {
        full_name: "María García",
        email: "",
        whatsapp: "+1987654321",
        password_hash: "salt$hash",
        store_name: "fashion-store",
        role: Role::Seller,
        status: ActiveStatus::Active,
    };
    ctx.storage.create_user(first.clone()).await.expect("first");
    let err = ctx
        .storage
        .create_user(first)
        .await
        .expect_err("second insert");

    let mapped = account_insert_error(err);
    assert_eq!(mapped.code, ErrorCode::Conflict);
    assert_eq!(mapped.message, DUPLICATE_WHATSAPP);

    let other = account_insert_error(anyhow::anyhow!("disk full"));
    assert_eq!(other.code, ErrorCode::Internal);
}
