//! Serializable views returned to callers.

use chrono::{DateTime, Utc};
use common::{CartId, CountryId, CreditCardId, CustomerId, ProductId, PurchaseId};
use domain::{
    Cart, CartProduct, CheckOutIssue, Country, CreditCard, Customer, Money, Product, Purchase,
    PurchasedProduct,
};
use serde::Serialize;

/// A line of a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartProductView {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub tax: Money,
    pub cost: Money,
}

impl From<&CartProduct> for CartProductView {
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

/// A customer's cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub products: Vec<CartProductView>,
    pub total_quantity: u32,
    pub total_tax: Money,

    /// Including tax.
    pub total_cost: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            cart_id: cart.id,
            customer_id: cart.customer_id,
            products: cart.products().iter().map(CartProductView::from).collect(),
            total_quantity: cart.total_quantity(),
            total_tax: cart.total_tax(),
            total_cost: cart.total_cost(),
        }
    }
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseView {
    pub purchase_id: PurchaseId,
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub products: Vec<PurchasedProduct>,
    pub total_tax: Money,
    pub total_cost: Money,
    pub created_at: DateTime<Utc>,
}

impl From<&Purchase> for PurchaseView {
    fn from(purchase: &Purchase) -> Self {
        Self {
            purchase_id: purchase.id,
            cart_id: purchase.cart_id,
            customer_id: purchase.customer_id,
            products: purchase.products().to_vec(),
            total_tax: purchase.total_tax(),
            total_cost: purchase.total_cost(),
            created_at: purchase.created_at,
        }
    }
}

/// Outcome of a checkout request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutResult {
    /// The cart became a purchase.
    Purchased(PurchaseView),

    /// Checkout was refused; nothing changed.
    Refused { issue: CheckOutIssue },
}

impl CheckoutResult {
    /// Returns the purchase id on success.
    pub fn purchase_id(&self) -> Option<PurchaseId> {
        match self {
            CheckoutResult::Purchased(view) => Some(view.purchase_id),
            CheckoutResult::Refused { .. } => None,
        }
    }

    /// Returns the refusal reason.
    pub fn issue(&self) -> Option<CheckOutIssue> {
        match self {
            CheckoutResult::Purchased(_) => None,
            CheckoutResult::Refused { issue } => Some(*issue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditCardView {
    pub id: CreditCardId,
    pub name_on_card: String,
    pub masked_number: String,
    pub expiry: DateTime<Utc>,
    pub active: bool,
}

impl From<&CreditCard> for CreditCardView {
    fn from(card: &CreditCard) -> Self {
        Self {
            id: card.id,
            name_on_card: card.name_on_card.clone(),
            masked_number: card.masked_number(),
            expiry: card.expiry,
            active: card.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country_code: String,
    pub country_name: String,
    pub credit_cards: Vec<CreditCardView>,
    pub created_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            country_code: customer.country.code.clone(),
            country_name: customer.country.name.clone(),
            credit_cards: customer.credit_cards.iter().map(CreditCardView::from).collect(),
            created_at: customer.created_at,
        }
    }
}

/// Purchase totals of one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerPurchaseHistory {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub total_purchases: usize,
    pub total_products_purchased: u32,
    pub total_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub price: Money,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryView {
    pub id: CountryId,
    pub code: String,
    pub name: String,
}

impl From<&Country> for CountryView {
    fn from(country: &Country) -> Self {
        Self {
            id: country.id,
            code: country.code.clone(),
            name: country.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_checkout_serializes_with_outcome_tag() {
        let result = CheckoutResult::Refused {
            issue: CheckOutIssue::EmptyCart,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "refused");
        assert_eq!(json["issue"], "EmptyCart");
        assert_eq!(result.purchase_id(), None);
    }
}
