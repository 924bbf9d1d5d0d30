use super::*;
use crate::test_support::{admin, context, seller};
use shared::{domain::ActiveStatus, error::ErrorCode, schedule::WeeklySchedule};

#[tokio::test]
async fn sellers_edit_their_own_store() {
    let ctx = context().await;
    let seller = seller(&ctx, "+1987654321", "fashion-store").await;

    let store = update_my_store(
        &ctx,
        &seller,
        vec![
            StoreField::Description("Moda para toda la familia".into()),
            StoreField::Category("Ropa y Accesorios".into()),
            StoreField::Instagram(Some("https://instagram.com/fashionstore".into())),
        ],
    )
    .await
    .expect("update");
    assert_eq!(store.description, "Moda para toda la familia");
    assert_eq!(store.category, "Ropa y Accesorios");

    let reloaded = my_store(&ctx, &seller).await.expect("store");
    assert_eq!(reloaded, store);
}

#[tokio::test]
async fn sellers_cannot_toggle_status_or_use_unknown_categories() {
    let ctx = context().await;
    let seller = seller(&ctx, "+1987654321", "fashion-store").await;

    let err = update_my_store(&ctx, &seller, vec![StoreField::Status(ActiveStatus::Inactive)])
        .await
        .expect_err("admin only");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = update_my_store(&ctx, &seller, vec![StoreField::Category("Moda".into())])
        .await
        .expect_err("unknown category");
    assert_eq!(err.code, ErrorCode::Validation);

    let untouched = my_store(&ctx, &seller).await.expect("store");
    assert_eq!(untouched.status, ActiveStatus::Active);
}

#[tokio::test]
async fn renaming_keeps_slugs_unique() {
    let ctx = context().await;
    let first = seller(&ctx, "+1987654321", "fashion-store").await;
    let second = seller(&ctx, "+1555000111", "tech-store").await;
    assert_eq!(my_store(&ctx, &first).await.expect("store").slug, "fashion-store");

    let renamed = update_my_store(
        &ctx,
        &second,
        vec![StoreField::Name("Fashion Store".into())],
    )
    .await
    .expect("rename");
    assert_eq!(renamed.name, "Fashion Store");
    assert_eq!(renamed.slug, "fashion-store-2");
}

#[tokio::test]
async fn admins_list_and_deactivate_stores() {
    let ctx = context().await;
    let admin = admin(&ctx).await;
    let seller = seller(&ctx, "+1987654321", "fashion-store").await;

    let err = list_stores(&ctx, &seller).await.expect_err("seller");
    assert_eq!(err.code, ErrorCode::Forbidden);
    let err = my_store(&ctx, &admin).await.expect_err("admin has no store page");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let stores = list_stores(&ctx, &admin).await.expect("stores");
    assert_eq!(stores.len(), 1);
    let store = update_store(
        &ctx,
        &admin,
        stores[0].store_id,
        vec![
            StoreField::Status(ActiveStatus::Inactive),
            StoreField::Schedule(WeeklySchedule::default()),
        ],
    )
    .await
    .expect("deactivate");
    assert_eq!(store.status, ActiveStatus::Inactive);

    let err = update_store(&ctx, &admin, StoreId(999), vec![])
        .await
        .expect_err("missing");
    assert_eq!(err.code, ErrorCode::NotFound);
}
