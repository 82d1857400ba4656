//! Shared types for the shop core.
//!
//! Every entity is identified by a UUID wrapped in its own newtype so that a
//! customer id can never be handed to a function expecting a product id.

pub mod types;

pub use types::{
    CartId, CorrelationId, CountryId, CreditCardId, CustomerId, EventId, ProductId, PurchaseId,
};
