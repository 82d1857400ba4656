//! Named specifications over shop entities.

use std::collections::HashSet;

use common::CustomerId;
use persistence::Specification;

use crate::{Cart, Country, Customer, Product, Purchase};

/// The open cart of a customer.
#[derive(Debug, Clone, Copy)]
pub struct CustomerCartSpec(pub CustomerId);

impl Specification<Cart> for CustomerCartSpec {
    fn is_satisfied_by(&self, cart: &Cart) -> bool {
        cart.customer_id == self.0 && cart.is_open()
    }
}

/// Customers registered with an email, ignoring case.
#[derive(Debug, Clone)]
pub struct CustomerAlreadyRegisteredSpec {
    email: String,
}

impl CustomerAlreadyRegisteredSpec {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
        }
    }
}

impl Specification<Customer> for CustomerAlreadyRegisteredSpec {
    fn is_satisfied_by(&self, customer: &Customer) -> bool {
        customer.email.to_lowercase() == self.email
    }
}

/// A customer by id.
#[derive(Debug, Clone, Copy)]
pub struct CustomerRegisteredSpec(pub CustomerId);

impl Specification<Customer> for CustomerRegisteredSpec {
    fn is_satisfied_by(&self, customer: &Customer) -> bool {
        customer.id == self.0
    }
}

/// Customers whose id is in a set.
#[derive(Debug, Clone, Default)]
pub struct CustomerBulkIdFindSpec(pub HashSet<CustomerId>);

impl FromIterator<CustomerId> for CustomerBulkIdFindSpec {
    fn from_iter<I: IntoIterator<Item = CustomerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Specification<Customer> for CustomerBulkIdFindSpec {
    fn is_satisfied_by(&self, customer: &Customer) -> bool {
        self.0.contains(&customer.id)
    }
}

/// Purchases made by a customer.
#[derive(Debug, Clone, Copy)]
pub struct CustomerPurchasesSpec(pub CustomerId);

impl Specification<Purchase> for CustomerPurchasesSpec {
    fn is_satisfied_by(&self, purchase: &Purchase) -> bool {
        purchase.customer_id == self.0
    }
}

/// Purchases containing at least N units in total.
#[derive(Debug, Clone, Copy)]
pub struct PurchasedNProductsSpec(pub u32);

impl Specification<Purchase> for PurchasedNProductsSpec {
    fn is_satisfied_by(&self, purchase: &Purchase) -> bool {
        purchase.products_purchased() >= self.0
    }
}

/// A product by catalog code.
#[derive(Debug, Clone)]
pub struct ProductCodeSpec(pub String);

impl Specification<Product> for ProductCodeSpec {
    fn is_satisfied_by(&self, product: &Product) -> bool {
        product.code == self.0
    }
}

/// A country by code, ignoring case.
#[derive(Debug, Clone)]
pub struct CountryCodeSpec(pub String);

impl Specification<Country> for CountryCodeSpec {
    fn is_satisfied_by(&self, country: &Country) -> bool {
        country.code.eq_ignore_ascii_case(&self.0)
    }
}
