//! Shopping carts and their line items.

use chrono::{DateTime, Utc};
use common::{CartId, CustomerId, ProductId, PurchaseId};
use persistence::{Entity, UniqueKey};
use serde::{Deserialize, Serialize};

use crate::events::{CartCreatedData, ProductAddedCartData, ProductRemovedCartData};
use crate::{Customer, Money, Product, ShopEvent, TaxPolicy, ValidationError};

/// A line in a cart.
///
/// Price and tax are snapshots taken when the line was built, not live
/// references to the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub tax: Money,
}

impl CartProduct {
    /// Builds a line, asking the tax policy for its tax.
    pub fn create(
        customer: &Customer,
        cart: &Cart,
        product: &Product,
        quantity: u32,
        tax_policy: &dyn TaxPolicy,
    ) -> Result<Self, ValidationError> {
        if !cart.is_open() {
            return Err(ValidationError::CartClosed { cart_id: cart.id });
        }
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity { quantity });
        }
        if product.price.checked_multiply(quantity).is_none() {
            return Err(ValidationError::CartTotalsOutOfRange { cart_id: cart.id });
        }

        Ok(Self {
            product_id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            tax: tax_policy.tax_for(customer, product, quantity),
        })
    }

    /// Price of the line before tax.
    pub fn cost(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Price of the line including tax.
    pub fn total(&self) -> Money {
        self.cost() + self.tax
    }

    fn checked_total(&self) -> Option<Money> {
        self.unit_price
            .checked_multiply(self.quantity)?
            .checked_add(self.tax)
    }
}

/// Total quantity and total price of some lines, or `None` if either overflows.
fn checked_totals<'a>(mut lines: impl Iterator<Item = &'a CartProduct>) -> Option<(u32, Money)> {
    lines.try_fold((0u32, Money::zero()), |(quantity, cost), line| {
        Some((
            quantity.checked_add(line.quantity)?,
            cost.checked_add(line.checked_total()?)?,
        ))
    })
}

/// A customer's shopping cart.
///
/// A customer has at most one open cart. Checkout closes the cart and records
/// the purchase it became; the next addition opens a new cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    products: Vec<CartProduct>,
    pub created_at: DateTime<Utc>,
    closed_by: Option<PurchaseId>,
}

// Command methods (return events)
impl Cart {
    /// Opens an empty cart for a customer.
    pub fn create(customer: &Customer) -> (Self, ShopEvent) {
        let cart = Self {
            id: CartId::new(),
            customer_id: customer.id,
            products: Vec::new(),
            created_at: Utc::now(),
            closed_by: None,
        };
        let event = ShopEvent::CartCreated(CartCreatedData {
            cart_id: cart.id,
            customer_id: cart.customer_id,
            created_at: cart.created_at,
        });
        (cart, event)
    }

    /// Adds a quantity of a product.
    ///
    /// A product already in the cart keeps a single line: the quantities are
    /// summed and the tax is computed once for the combined quantity.
    pub fn add_product(
        &mut self,
        customer: &Customer,
        product: &Product,
        quantity: u32,
        tax_policy: &dyn TaxPolicy,
    ) -> Result<ShopEvent, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity { quantity });
        }

        let position = self.position_of(&product.id);
        let line_quantity = match position {
            Some(index) => self.products[index]
                .quantity
                .checked_add(quantity)
                .ok_or(ValidationError::InvalidQuantity { quantity })?,
            None => quantity,
        };
        let line = CartProduct::create(customer, self, product, line_quantity, tax_policy)?;
        let others = self
            .products
            .iter()
            .filter(|p| p.product_id != line.product_id);
        if checked_totals(others.chain(std::iter::once(&line))).is_none() {
            return Err(ValidationError::CartTotalsOutOfRange { cart_id: self.id });
        }

        let event = ShopEvent::ProductAddedCart(ProductAddedCartData {
            cart_id: self.id,
            customer_id: self.customer_id,
            product_id: line.product_id,
            product_code: line.code.clone(),
            quantity_added: quantity,
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax: line.tax,
        });
        match position {
            Some(index) => self.products[index] = line,
            None => self.products.push(line),
        }
        Ok(event)
    }

    /// Removes the line for a product.
    pub fn remove_product(&mut self, product_id: &ProductId) -> Result<ShopEvent, ValidationError> {
        if !self.is_open() {
            return Err(ValidationError::CartClosed { cart_id: self.id });
        }
        let index = self
            .position_of(product_id)
            .ok_or(ValidationError::ProductNotInCart {
                product_id: *product_id,
            })?;

        let line = self.products.remove(index);
        Ok(ShopEvent::ProductRemovedCart(ProductRemovedCartData {
            cart_id: self.id,
            customer_id: self.customer_id,
            product_id: line.product_id,
            quantity: line.quantity,
        }))
    }

    /// Closes the cart after it became a purchase.
    pub(crate) fn close(&mut self, purchase_id: PurchaseId) -> Result<(), ValidationError> {
        if !self.is_open() {
            return Err(ValidationError::CartClosed { cart_id: self.id });
        }
        self.closed_by = Some(purchase_id);
        Ok(())
    }

    fn position_of(&self, product_id: &ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.product_id == *product_id)
    }
}

// Query methods
impl Cart {
    /// Returns the lines in the order they were first added.
    pub fn products(&self) -> &[CartProduct] {
        &self.products
    }

    /// Returns the line for a product.
    pub fn get_product(&self, product_id: &ProductId) -> Option<&CartProduct> {
        self.position_of(product_id).map(|i| &self.products[i])
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Returns true until the cart is checked out.
    pub fn is_open(&self) -> bool {
        self.closed_by.is_none()
    }

    /// Returns the purchase this cart became, if checked out.
    pub fn closed_by(&self) -> Option<PurchaseId> {
        self.closed_by
    }

    /// Returns the total quantity over all lines.
    pub fn total_quantity(&self) -> u32 {
        self.products
            .iter()
            .fold(0, |total, p| total.saturating_add(p.quantity))
    }

    /// Returns the tax over all lines.
    pub fn total_tax(&self) -> Money {
        self.products.iter().map(|p| p.tax).sum()
    }

    /// Returns the price over all lines, including tax.
    pub fn total_cost(&self) -> Money {
        self.products.iter().map(CartProduct::total).sum()
    }
}

impl Entity for Cart {
    type Id = CartId;

    fn entity_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> &CartId {
        &self.id
    }

    // Only open carts occupy the index, so closed carts never block a new one.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        if self.is_open() {
            vec![UniqueKey::new("open_cart_customer", self.customer_id.to_string())]
        } else {
            Vec::new()
        }
    }
}
