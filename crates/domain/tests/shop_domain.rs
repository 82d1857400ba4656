//! Integration tests for the shop entities stored through the in-memory store.
//!
//! These tests verify that the entities' unique indexes and the named
//! specifications behave as the application layer relies on.

use chrono::{Duration, Utc};
use domain::{
    Cart, CheckoutService, Country, CreditCard, Customer, CustomerAlreadyRegisteredSpec,
    CustomerBulkIdFindSpec, CustomerCartSpec, CustomerPurchasesSpec, Money, Product,
    ProductCodeSpec, Purchase, PurchasedNProductsSpec, TaxRate, TaxService,
};
use persistence::{
    InMemoryStore, Repository, RepositoryExt, StorageError, UnitOfWork, UnitOfWorkFactory,
};

fn uk() -> Country {
    Country::create("UK", "United Kingdom").unwrap()
}

fn customer(email: &str) -> Customer {
    let (mut customer, _) = Customer::create("Test", "Customer", email, uk()).unwrap();
    let card = CreditCard::create(
        "Test Customer",
        "4111111111111111",
        Utc::now() + Duration::days(365),
    )
    .unwrap();
    customer.add_credit_card(card);
    customer
}

fn tax() -> TaxService {
    TaxService::new(TaxRate::zero()).with_rate("UK", TaxRate::from_percent(20))
}

mod unique_indexes {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryStore::new();
        let uow = store.begin();
        uow.repository::<Customer>()
            .add(&customer("ann@example.com"))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin();
        uow.repository::<Customer>()
            .add(&customer("ANN@example.com"))
            .await
            .unwrap();
        let result = uow.commit().await;
        assert!(matches!(
            result,
            Err(StorageError::ConstraintViolation {
                index: "customer_email",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn second_open_cart_is_rejected_but_closed_carts_are_not() {
        let store = InMemoryStore::new();
        let ann = customer("ann@example.com");
        let (product, _) = Product::create("SKU-1", "Widget", Money::from_cents(500)).unwrap();

        let (mut first, _) = Cart::create(&ann);
        first.add_product(&ann, &product, 1, &tax()).unwrap();
        let uow = store.begin();
        uow.repository::<Cart>().add(&first).await.unwrap();
        uow.commit().await.unwrap();

        let (second, _) = Cart::create(&ann);
        let uow = store.begin();
        uow.repository::<Cart>().add(&second).await.unwrap();
        assert!(matches!(
            uow.commit().await,
            Err(StorageError::ConstraintViolation {
                index: "open_cart_customer",
                ..
            })
        ));

        CheckoutService::default()
            .checkout(&ann, &mut first, Utc::now())
            .unwrap();
        let uow = store.begin();
        let carts = uow.repository::<Cart>();
        carts.update(&first).await.unwrap();
        carts.add(&second).await.unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin();
        let open = uow
            .repository::<Cart>()
            .find_one(&CustomerCartSpec(ann.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open.id, second.id);
        assert_eq!(store.row_count("Cart").await, 2);
    }

    #[tokio::test]
    async fn duplicate_product_code_is_rejected() {
        let store = InMemoryStore::new();
        let uow = store.begin();
        let products = uow.repository::<Product>();
        products
            .add(&Product::create("SKU-1", "A", Money::from_cents(1)).unwrap().0)
            .await
            .unwrap();
        products
            .add(&Product::create("SKU-1", "B", Money::from_cents(2)).unwrap().0)
            .await
            .unwrap();
        assert!(uow.commit().await.is_err());
        assert_eq!(store.row_count("Product").await, 0);
    }
}

mod specifications {
    use super::*;

    async fn purchase_for(customer: &Customer, quantity: u32) -> Purchase {
        let (product, _) = Product::create("SKU-P", "Widget", Money::from_cents(1000)).unwrap();
        let (mut cart, _) = Cart::create(customer);
        cart.add_product(customer, &product, quantity, &tax()).unwrap();
        CheckoutService::default()
            .checkout(customer, &mut cart, Utc::now())
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn purchase_history_queries() {
        let store = InMemoryStore::new();
        let ann = customer("ann@example.com");
        let bob = customer("bob@example.com");
        let cid = customer("cid@example.com");

        let uow = store.begin();
        let customers = uow.repository::<Customer>();
        let purchases = uow.repository::<Purchase>();
        for c in [&ann, &bob, &cid] {
            customers.add(c).await.unwrap();
        }
        purchases.add(&purchase_for(&ann, 1).await).await.unwrap();
        purchases.add(&purchase_for(&ann, 4).await).await.unwrap();
        purchases.add(&purchase_for(&bob, 2).await).await.unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin();
        let purchases = uow.repository::<Purchase>();
        let buyers: CustomerBulkIdFindSpec = purchases
            .find_all(&PurchasedNProductsSpec(2))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.customer_id)
            .collect();
        let found = uow.repository::<Customer>().find_all(&buyers).await.unwrap();
        let emails: Vec<_> = found.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["ann@example.com", "bob@example.com"]);

        let anns = purchases.find_all(&CustomerPurchasesSpec(ann.id)).await.unwrap();
        assert_eq!(anns.len(), 2);
        let total: Money = anns.iter().map(Purchase::total_cost).sum();
        // 5 units at 10.00 plus 20% tax
        assert_eq!(total.cents(), 6000);
    }

    #[tokio::test]
    async fn lookups_by_code_and_email() {
        let store = InMemoryStore::new();
        let uow = store.begin();
        let (product, _) = Product::create("SKU-9", "Gadget", Money::from_cents(250)).unwrap();
        uow.repository::<Product>().add(&product).await.unwrap();
        uow.repository::<Customer>()
            .add(&customer("dee@example.com"))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin();
        let found = uow
            .repository::<Product>()
            .find_one(&ProductCodeSpec("SKU-9".to_string()))
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some(product.id));
        assert!(
            uow.repository::<Customer>()
                .exists(&CustomerAlreadyRegisteredSpec::new("DEE@example.com"))
                .await
                .unwrap()
        );
    }
}
