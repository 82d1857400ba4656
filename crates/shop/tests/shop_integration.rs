//! Integration tests for the shop composition root.

use domain::ShopEvent;
use persistence::InMemoryStore;
use shop::{Shop, ShopConfig, build_event_bus, demo, in_request};

use std::sync::Arc;

use application::CheckoutResult;
use event_bus::{TaskCorrelation, correlation};

#[test]
fn every_event_type_is_recorded() {
    let bus = build_event_bus(Arc::new(TaskCorrelation));
    for event_type in ShopEvent::ALL_TYPES {
        assert_eq!(bus.handler_names(event_type), vec!["DomainEventHandle"]);
    }
}

#[tokio::test]
async fn in_request_scopes_a_fresh_correlation_id() {
    let (id, seen) = in_request(async { correlation::current() }).await;
    assert_eq!(seen, Some(id));
    assert!(correlation::current().is_none());
}

#[tokio::test]
async fn demo_checks_out_a_uk_cart() {
    let store = InMemoryStore::new();
    let shop = Shop::new(store.clone(), &ShopConfig::default());

    let report = demo::run(&shop).await.unwrap();

    assert_eq!(report.cart.products.len(), 2);
    assert_eq!(report.cart.products[1].quantity, 2);
    // 24.99 + 2 x 6.50 = 37.99, 20% UK tax: 5.00 (kettle) + 2.60 (mugs)
    assert_eq!(report.cart.total_tax.cents(), 760);
    let CheckoutResult::Purchased(purchase) = &report.checkout else {
        panic!("checkout refused");
    };
    assert_eq!(purchase.total_cost.cents(), 4559);
    assert_eq!(report.purchase_history.len(), 1);
    assert_eq!(report.purchase_history[0].total_products_purchased, 3);

    let types: Vec<_> = report
        .checkout_events
        .iter()
        .map(|r| r.event_type.as_str())
        .collect();
    assert_eq!(types, vec!["CustomerCheckedOut"]);
    assert_eq!(store.row_count("Purchase").await, 1);
}

#[tokio::test]
async fn configured_shipping_countries_refuse_other_customers() {
    let config = ShopConfig::from_lookup(|var| {
        (var == "SHOP_SHIPPING_COUNTRIES").then(|| "IE".to_string())
    })
    .unwrap();
    let shop = Shop::new(InMemoryStore::new(), &config);

    let report = demo::run(&shop).await.unwrap();

    assert!(matches!(report.checkout, CheckoutResult::Refused { .. }));
    assert!(report.purchase_history.is_empty());
    assert!(report.checkout_events.is_empty());
    assert_eq!(
        ShopEvent::ALL_TYPES
            .iter()
            .filter(|t| shop.bus().handler_count(t) == 1)
            .count(),
        ShopEvent::ALL_TYPES.len()
    );
}
