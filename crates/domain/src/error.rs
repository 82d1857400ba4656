//! Domain validation errors.

use common::{CartId, ProductId};
use thiserror::Error;

/// A rule of the domain model was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// The email address is not well formed.
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// Quantities must be positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Prices must not be negative.
    #[error("Invalid price: {cents} cents (must not be negative)")]
    InvalidPrice { cents: i64 },

    /// The product has no line in the cart.
    #[error("Product {product_id} is not in the cart")]
    ProductNotInCart { product_id: ProductId },

    /// The cart's quantities or prices no longer fit their numeric range.
    #[error("Cart {cart_id} totals are out of range")]
    CartTotalsOutOfRange { cart_id: CartId },

    /// The cart was already checked out.
    #[error("Cart {cart_id} is closed")]
    CartClosed { cart_id: CartId },

    /// Another customer registered with this email.
    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    /// Another product uses this code.
    #[error("Product code already in use: {code}")]
    DuplicateProductCode { code: String },

    /// Another country uses this code.
    #[error("Country code already in use: {code}")]
    DuplicateCountryCode { code: String },

    /// The credit card details are unusable.
    #[error("Invalid credit card: {reason}")]
    InvalidCard { reason: &'static str },
}

/// Trims a required text field, rejecting blank input.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}
