//! Seeded walk-through of the cart and checkout workflow.

use application::{
    CartView, CheckoutResult, CustomerPurchaseHistory, CustomerView, EventFilter, NewCreditCard,
    NewCustomer, Result,
};
use chrono::{Duration, Utc};
use domain::Money;
use event_bus::DomainEventRecord;
use persistence::UnitOfWorkFactory;
use serde::Serialize;

use crate::{Shop, in_request};

/// Everything the demo produced, ready to print.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub customer: CustomerView,
    pub cart: CartView,
    pub checkout: CheckoutResult,
    pub purchase_history: Vec<CustomerPurchaseHistory>,

    /// Records written while serving the checkout request.
    pub checkout_events: Vec<DomainEventRecord>,
}

/// Registers a UK customer, fills a cart, and checks it out.
#[tracing::instrument(skip(shop))]
pub async fn run<F: UnitOfWorkFactory + Clone>(shop: &Shop<F>) -> Result<DemoReport> {
    let uk = shop.catalog.add_country("UK", "United Kingdom").await?;
    shop.catalog.add_country("IE", "Ireland").await?;
    let kettle = shop
        .catalog
        .add_product("KET-01", "Kettle", Money::from_cents(2499))
        .await?;
    let mug = shop
        .catalog
        .add_product("MUG-02", "Mug", Money::from_cents(650))
        .await?;

    let customer = shop
        .customers
        .register_customer(NewCustomer {
            first_name: "Cora".to_string(),
            last_name: "Lind".to_string(),
            email: "cora@example.com".to_string(),
            country_id: uk.id,
        })
        .await?;
    shop.customers
        .add_credit_card(
            customer.id,
            NewCreditCard {
                name_on_card: "Cora Lind".to_string(),
                card_number: "4000 0566 5566 5556".to_string(),
                expiry: Utc::now() + Duration::days(3 * 365),
            },
        )
        .await?;

    shop.carts.add_to_cart(customer.id, kettle.id, 1).await?;
    shop.carts.add_to_cart(customer.id, mug.id, 1).await?;
    let cart = shop.carts.add_to_cart(customer.id, mug.id, 1).await?;

    let (request, checkout) = in_request(shop.carts.checkout(customer.id)).await;
    let checkout = checkout?;
    tracing::info!(correlation_id = %request, purchase_id = ?checkout.purchase_id(), "demo checkout finished");

    Ok(DemoReport {
        customer: shop.customers.get_customer(customer.id).await?,
        cart,
        checkout,
        purchase_history: shop.customers.purchase_history().await?,
        checkout_events: shop.history.events(EventFilter::correlated(request)).await?,
    })
}
