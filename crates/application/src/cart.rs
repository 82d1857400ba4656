//! Cart and checkout workflow.

use std::sync::Arc;

use chrono::Utc;
use common::{CustomerId, ProductId};
use domain::{
    Cart, CheckoutService, Customer, CustomerCartSpec, Product, Purchase, ShopEvent, TaxPolicy,
    ValidationError,
};
use event_bus::DomainEvents;
use persistence::UnitOfWorkFactory;

use crate::operation::Operation;
use crate::{ApplicationError, CartView, CheckoutResult, PurchaseView, Result};

/// Service for a customer's cart and its checkout.
///
/// Each mutating call runs in its own unit of work: entities are loaded,
/// the domain operation runs and its events are raised as they happen, and
/// the unit of work commits once at the end. Any error before the commit
/// leaves storage untouched.
pub struct CartService<F: UnitOfWorkFactory> {
    factory: F,
    bus: Arc<DomainEvents<ShopEvent>>,
    tax: Arc<dyn TaxPolicy>,
    checkout: CheckoutService,
}

impl<F: UnitOfWorkFactory> CartService<F> {
    /// Creates a new cart service.
    pub fn new(
        factory: F,
        bus: Arc<DomainEvents<ShopEvent>>,
        tax: Arc<dyn TaxPolicy>,
        checkout: CheckoutService,
    ) -> Self {
        Self {
            factory,
            bus,
            tax,
            checkout,
        }
    }

    /// Adds a quantity of a product to the customer's cart, opening one if needed.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity { quantity }.into());
        }

        let op = Operation::begin(&self.factory, &self.bus);
        let customer = op
            .repository::<Customer>()
            .find_by_id(&customer_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", customer_id))?;
        let product = op
            .repository::<Product>()
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", product_id))?;

        let carts = op.repository::<Cart>();
        let (mut cart, opened) = match carts.find_one(&CustomerCartSpec(customer_id)).await? {
            Some(cart) => (cart, false),
            None => {
                let (cart, event) = Cart::create(&customer);
                op.raise(event).await?;
                (cart, true)
            }
        };

        let event = cart.add_product(&customer, &product, quantity, self.tax.as_ref())?;
        op.raise(event).await?;

        if opened {
            carts.add(&cart).await?;
        } else {
            carts.update(&cart).await?;
        }
        op.commit().await?;

        metrics::counter!("cart_operations_total", "operation" => "add").increment(1);
        tracing::info!(cart_id = %cart.id, opened, "product added to cart");
        Ok(CartView::from(&cart))
    }

    /// Removes a product's line from the customer's open cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<CartView> {
        let op = Operation::begin(&self.factory, &self.bus);
        op.repository::<Product>()
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", product_id))?;
        let carts = op.repository::<Cart>();
        let mut cart = carts
            .find_one(&CustomerCartSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Cart", customer_id))?;

        let event = cart.remove_product(&product_id)?;
        op.raise(event).await?;
        carts.update(&cart).await?;
        op.commit().await?;

        metrics::counter!("cart_operations_total", "operation" => "remove").increment(1);
        Ok(CartView::from(&cart))
    }

    /// Returns the customer's open cart.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<CartView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let cart = op
            .repository::<Cart>()
            .find_one(&CustomerCartSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Cart", customer_id))?;
        Ok(CartView::from(&cart))
    }

    /// Checks out the customer's open cart.
    ///
    /// A refusal is returned as [`CheckoutResult::Refused`]; it raises no
    /// event, creates no purchase, and does not commit.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, customer_id: CustomerId) -> Result<CheckoutResult> {
        let op = Operation::begin(&self.factory, &self.bus);
        let carts = op.repository::<Cart>();
        let mut cart = carts
            .find_one(&CustomerCartSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Cart", customer_id))?;
        let customer = op
            .repository::<Customer>()
            .find_by_id(&cart.customer_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", cart.customer_id))?;

        let now = Utc::now();
        let checked_out = match self.checkout.can_check_out(&customer, &cart, now) {
            Some(issue) => Err(issue),
            None => self.checkout.checkout(&customer, &mut cart, now),
        };
        let (purchase, event) = match checked_out {
            Ok(done) => done,
            Err(issue) => {
                metrics::counter!("checkouts_total", "outcome" => "refused").increment(1);
                tracing::info!(%issue, cart_id = %cart.id, "checkout refused");
                return Ok(CheckoutResult::Refused { issue });
            }
        };

        op.repository::<Purchase>().add(&purchase).await?;
        carts.update(&cart).await?;
        op.raise(event).await?;
        op.commit().await?;

        metrics::counter!("checkouts_total", "outcome" => "purchased").increment(1);
        metrics::histogram!("checkout_total_cost_cents").record(purchase.total_cost().cents() as f64);
        tracing::info!(purchase_id = %purchase.id, "checkout complete");
        Ok(CheckoutResult::Purchased(PurchaseView::from(&purchase)))
    }
}
