//! Completed purchases.

use chrono::{DateTime, Utc};
use common::{CartId, CustomerId, ProductId, PurchaseId};
use persistence::Entity;
use serde::{Deserialize, Serialize};

use crate::{Cart, CartProduct, Money};

/// A purchased line, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedProduct {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub tax: Money,

    /// Price before tax.
    pub cost: Money,
}

impl From<&CartProduct> for PurchasedProduct {
    fn from(line: &CartProduct) -> Self {
        Self {
            product_id: line.product_id,
            code: line.code.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax: line.tax,
            cost: line.cost(),
        }
    }
}

/// The immutable record of a checked-out cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub customer_id: CustomerId,
    pub cart_id: CartId,
    pub created_at: DateTime<Utc>,
    products: Vec<PurchasedProduct>,
    total_tax: Money,
    total_cost: Money,
}

impl Purchase {
    /// Snapshots the cart's lines.
    pub(crate) fn from_cart(cart: &Cart, created_at: DateTime<Utc>) -> Self {
        Self {
            id: PurchaseId::new(),
            customer_id: cart.customer_id,
            cart_id: cart.id,
            created_at,
            products: cart.products().iter().map(PurchasedProduct::from).collect(),
            total_tax: cart.total_tax(),
            total_cost: cart.total_cost(),
        }
    }

    pub fn products(&self) -> &[PurchasedProduct] {
        &self.products
    }

    /// Total quantity over all lines.
    pub fn products_purchased(&self) -> u32 {
        self.products
            .iter()
            .fold(0, |total, p| total.saturating_add(p.quantity))
    }

    pub fn total_tax(&self) -> Money {
        self.total_tax
    }

    /// Total price including tax.
    pub fn total_cost(&self) -> Money {
        self.total_cost
    }
}

impl Entity for Purchase {
    type Id = PurchaseId;

    fn entity_type() -> &'static str {
        "Purchase"
    }

    fn id(&self) -> &PurchaseId {
        &self.id
    }
}
