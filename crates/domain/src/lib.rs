//! Domain layer for the shop.
//!
//! This crate provides:
//! - Entities: [`Customer`], [`Country`], [`Product`], [`Cart`] with its
//!   [`CartProduct`] lines, and the immutable [`Purchase`]
//! - [`ShopEvent`], the snapshot events raised by entity operations
//! - Named specifications selecting entities from repositories
//! - The tax and checkout domain services

pub mod cart;
pub mod country;
pub mod customer;
pub mod error;
pub mod events;
pub mod product;
pub mod purchase;
pub mod services;
pub mod specifications;
pub mod values;

pub use cart::{Cart, CartProduct};
pub use country::Country;
pub use customer::{CreditCard, Customer};
pub use error::ValidationError;
pub use events::ShopEvent;
pub use product::Product;
pub use purchase::{Purchase, PurchasedProduct};
pub use services::{CheckOutIssue, CheckoutPolicy, CheckoutService, TaxPolicy, TaxService};
pub use specifications::{
    CountryCodeSpec, CustomerAlreadyRegisteredSpec, CustomerBulkIdFindSpec, CustomerCartSpec,
    CustomerPurchasesSpec, CustomerRegisteredSpec, ProductCodeSpec, PurchasedNProductsSpec,
};
pub use values::{Money, TaxRate};
