//! The typed catalog, order, and account surfaces against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use jacaranda_client::models::{NewUser, ShippingAddress};
use jacaranda_client::{CartLine, Credentials};
use jacaranda_core::{Email, OrderStatus, PaymentStatus};
use jacaranda_integration_tests::MockShop;

#[tokio::test]
async fn test_catalog_round_trip() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();

    let products = shop.catalog.products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Linen Shirt");
    assert!(products[0].is_featured);
    assert!(products[0].wholesale.is_some());
    assert_eq!(products[0].details.len(), 2);

    let detail = shop.catalog.product_by_slug("linen-shirt").await.unwrap();
    assert_eq!(detail.variants.len(), 2);
    assert_eq!(detail.variants[1].color, "clay");
    assert!(detail.variants[0].in_stock());

    let variants = shop.catalog.variants_for(&detail.product.id).await.unwrap();
    assert_eq!(variants.len(), 2);

    let categories = shop.catalog.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Shirts");
}

#[tokio::test]
async fn test_login_logout_lifecycle() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();
    assert!(!shop.session.is_authenticated());

    let user = shop
        .session
        .login(Credentials::new(
            Email::parse("admin@example.com").unwrap(),
            "secret",
        ))
        .await
        .unwrap();
    assert_eq!(user.display_name(), "admin Test");
    assert!(shop.session.is_admin());
    assert_eq!(shop.session.user_id(), Some("u-admin".into()));

    shop.session.logout().await;
    assert!(!shop.session.is_authenticated());
    assert!(shop.session.user_id().is_none());
}

#[tokio::test]
async fn test_registration_acknowledged() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();

    let reply = shop
        .session
        .register(NewUser {
            email: Email::parse("bruno@example.com").unwrap(),
            first_name: "Bruno".into(),
            last_name: "Souza".into(),
            password: String::from("secret").into(),
        })
        .await
        .unwrap();

    assert_eq!(reply.message, "User created successfully");
    // Registration does not create a session.
    assert!(!shop.session.is_authenticated());
}

#[tokio::test]
async fn test_place_order_clears_the_cart() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();
    shop.session
        .login(Credentials::new(
            Email::parse("ana@example.com").unwrap(),
            "secret",
        ))
        .await
        .unwrap();

    let detail = shop.catalog.product_by_slug("linen-shirt").await.unwrap();
    shop.cart
        .add_line(CartLine::from_catalog(&detail.product, &detail.variants[0], 1));

    let address = ShippingAddress {
        street: "Rua das Flores 10".into(),
        city: "Campinas".into(),
        state: "SP".into(),
        zip_code: "13000-000".into(),
        country: "BR".into(),
        complement: None,
    };
    let order = shop
        .orders
        .place_order(&shop.cart, address, "credit_card")
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(shop.cart.is_empty());
    assert_eq!(mock.state.orders_placed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_order_history_parses_money_and_status() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();
    shop.session
        .login(Credentials::new(
            Email::parse("ana@example.com").unwrap(),
            "secret",
        ))
        .await
        .unwrap();

    let orders = shop.orders.history().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.total_price.to_string(), "$149.90");
    assert_eq!(order.items.len(), 1);
}

#[tokio::test]
async fn test_admin_dashboard_requires_a_session() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();

    shop.session
        .login(Credentials::new(
            Email::parse("admin@example.com").unwrap(),
            "secret",
        ))
        .await
        .unwrap();

    let stats = shop.admin.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_products, 2);
    assert_eq!(stats.top_products.len(), 1);
    assert_eq!(stats.sales_by_month.len(), 2);
}
