//! Stateless domain services.

mod checkout;
mod tax;

pub use checkout::{CheckOutIssue, CheckoutPolicy, CheckoutService};
pub use tax::{TaxPolicy, TaxService};
