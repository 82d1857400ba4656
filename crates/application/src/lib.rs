//! Application services for the shop.
//!
//! Every service method is one operation: it begins a unit of work, loads the
//! entities it needs, runs the domain operation while raising its events on
//! the bus, and commits once. Reads never commit.

mod cart;
mod catalog;
mod customer;
mod error;
mod history;
mod operation;
mod views;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use customer::{CustomerService, NewCreditCard, NewCustomer};
pub use error::{ApplicationError, Result};
pub use history::{EventFilter, HistoryService};
pub use views::{
    CartProductView, CartView, CheckoutResult, CountryView, CreditCardView, CustomerPurchaseHistory,
    CustomerView, ProductView, PurchaseView,
};
