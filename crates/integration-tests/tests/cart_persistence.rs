//! Per-user cart persistence across logins and process restarts.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use jacaranda_client::{CartLine, Credentials, FileStorage, Shop, Storage};
use jacaranda_core::Email;
use jacaranda_integration_tests::MockShop;

async fn login(shop: &Shop, email: &str) {
    shop.session
        .login(Credentials::new(Email::parse(email).unwrap(), "secret"))
        .await
        .unwrap();
}

async fn linen_shirt_line(shop: &Shop, quantity: u32) -> CartLine {
    let detail = shop.catalog.product_by_slug("linen-shirt").await.unwrap();
    CartLine::from_catalog(&detail.product, &detail.variants[0], quantity)
}

#[tokio::test]
async fn test_cart_swaps_wholesale_between_users() {
    let mock = MockShop::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()).unwrap());
    let shop = mock.shop_with_storage(storage);

    login(&shop, "ana@example.com").await;
    shop.cart.add_line(linen_shirt_line(&shop, 2).await);
    assert_eq!(shop.cart.item_count(), 2);
    shop.session.logout().await;
    assert!(shop.cart.is_empty());

    // Bruno never sees Ana's lines.
    login(&shop, "bruno@example.com").await;
    assert!(shop.cart.is_empty());
    shop.cart.add_line(linen_shirt_line(&shop, 1).await);
    shop.session.logout().await;

    // Ana's cart comes back exactly as she left it, not merged.
    login(&shop, "ana@example.com").await;
    assert_eq!(shop.cart.item_count(), 2);
    assert_eq!(shop.cart.lines().len(), 1);
}

#[tokio::test]
async fn test_cart_survives_a_restart() {
    let mock = MockShop::spawn().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()).unwrap());
        let shop = mock.shop_with_storage(storage);
        login(&shop, "ana@example.com").await;
        shop.cart.add_line(linen_shirt_line(&shop, 3).await);
    }

    // A fresh process restores the cached identity and with it the cart.
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()).unwrap());
    let shop = mock.shop_with_storage(storage);
    shop.session.restore();
    assert!(shop.session.is_authenticated());
    assert_eq!(shop.cart.item_count(), 3);
}

#[tokio::test]
async fn test_anonymous_lines_are_discarded_on_login() {
    let mock = MockShop::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()).unwrap());
    let shop = mock.shop_with_storage(storage);

    shop.cart.add_line(linen_shirt_line(&shop, 1).await);
    assert_eq!(shop.cart.item_count(), 1);

    login(&shop, "ana@example.com").await;
    assert!(shop.cart.is_empty());
}

#[tokio::test]
async fn test_same_variant_merges_and_other_variant_appends() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();
    login(&shop, "ana@example.com").await;

    let detail = shop.catalog.product_by_slug("linen-shirt").await.unwrap();
    shop.cart
        .add_line(CartLine::from_catalog(&detail.product, &detail.variants[0], 1));
    shop.cart
        .add_line(CartLine::from_catalog(&detail.product, &detail.variants[0], 2));
    shop.cart
        .add_line(CartLine::from_catalog(&detail.product, &detail.variants[1], 1));

    let lines = shop.cart.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(shop.cart.item_count(), 4);
}
