//! Shop domain events.
//!
//! Every event is a self-contained snapshot: it carries ids and copied values,
//! never references to live entities, so handlers can serialize it as is.

use chrono::{DateTime, Utc};
use common::{CartId, CreditCardId, CustomerId, ProductId, PurchaseId};
use event_bus::DomainEvent;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Events raised by shop entity operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShopEvent {
    /// A customer registered.
    CustomerCreated(CustomerCreatedData),

    /// A customer changed their email address.
    CustomerChangedEmail(CustomerChangedEmailData),

    /// A credit card was added to a customer.
    CreditCardAdded(CreditCardAddedData),

    /// A customer was removed.
    CustomerRemoved(CustomerRemovedData),

    /// A product was added to the catalog.
    ProductCreated(ProductCreatedData),

    /// A cart was opened for a customer.
    CartCreated(CartCreatedData),

    /// A product was added to a cart, or its line grew.
    ProductAddedCart(ProductAddedCartData),

    /// A product line was removed from a cart.
    ProductRemovedCart(ProductRemovedCartData),

    /// A cart was checked out into a purchase.
    CustomerCheckedOut(CustomerCheckedOutData),
}

impl ShopEvent {
    /// Every event type tag, for handler registration.
    pub const ALL_TYPES: [&'static str; 9] = [
        "CustomerCreated",
        "CustomerChangedEmail",
        "CreditCardAdded",
        "CustomerRemoved",
        "ProductCreated",
        "CartCreated",
        "ProductAddedCart",
        "ProductRemovedCart",
        "CustomerCheckedOut",
    ];
}

impl DomainEvent for ShopEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShopEvent::CustomerCreated(_) => "CustomerCreated",
            ShopEvent::CustomerChangedEmail(_) => "CustomerChangedEmail",
            ShopEvent::CreditCardAdded(_) => "CreditCardAdded",
            ShopEvent::CustomerRemoved(_) => "CustomerRemoved",
            ShopEvent::ProductCreated(_) => "ProductCreated",
            ShopEvent::CartCreated(_) => "CartCreated",
            ShopEvent::ProductAddedCart(_) => "ProductAddedCart",
            ShopEvent::ProductRemovedCart(_) => "ProductRemovedCart",
            ShopEvent::CustomerCheckedOut(_) => "CustomerCheckedOut",
        }
    }
}

/// Data for CustomerCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCreatedData {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country_code: String,
    pub created_at: DateTime<Utc>,
}

/// Data for CustomerChangedEmail event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerChangedEmailData {
    pub customer_id: CustomerId,
    pub old_email: String,
    pub new_email: String,
}

/// Data for CreditCardAdded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardAddedData {
    pub customer_id: CustomerId,
    pub credit_card_id: CreditCardId,

    /// Card number masked to its last four digits.
    pub masked_number: String,
    pub expiry: DateTime<Utc>,
}

/// Data for CustomerRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRemovedData {
    pub customer_id: CustomerId,
    pub email: String,
}

/// Data for ProductCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub price: Money,
}

/// Data for CartCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCreatedData {
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
}

/// Data for ProductAddedCart event.
///
/// `quantity` and `tax` describe the whole line after the addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAddedCartData {
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub product_code: String,
    pub quantity_added: u32,
    pub quantity: u32,
    pub unit_price: Money,
    pub tax: Money,
}

/// Data for ProductRemovedCart event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRemovedCartData {
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Data for CustomerCheckedOut event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCheckedOutData {
    pub purchase_id: PurchaseId,
    pub cart_id: CartId,
    pub customer_id: CustomerId,
    pub products_purchased: u32,
    pub total_tax: Money,
    pub total_cost: Money,
    pub checked_out_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_matches_serde_tag() {
        let event = ShopEvent::CartCreated(CartCreatedData {
            cart_id: CartId::new(),
            customer_id: CustomerId::new(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert!(ShopEvent::ALL_TYPES.contains(&event.event_type()));
    }

    #[test]
    fn test_payload_round_trips() {
        let event = ShopEvent::CustomerRemoved(CustomerRemovedData {
            customer_id: CustomerId::new(),
            email: "ann@example.com".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        let back: ShopEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
