//! Tax computation.

use std::collections::HashMap;

use crate::{Customer, Money, Product, TaxRate};

/// Computes the tax owed on a cart line.
///
/// Lines are built through [`CartProduct::create`](crate::CartProduct::create),
/// which hands the policy the customer and product so that jurisdiction rules
/// stay here rather than in either entity.
pub trait TaxPolicy: Send + Sync {
    /// Returns the tax for `quantity` units of `product` sold to `customer`.
    fn tax_for(&self, customer: &Customer, product: &Product, quantity: u32) -> Money;
}

/// Rate-table tax policy keyed by the customer's country code.
#[derive(Debug, Clone, Default)]
pub struct TaxService {
    rates: HashMap<String, TaxRate>,
    default_rate: TaxRate,
}

impl TaxService {
    /// Creates a service charging `default_rate` in every country.
    pub fn new(default_rate: TaxRate) -> Self {
        Self {
            rates: HashMap::new(),
            default_rate,
        }
    }

    /// Sets the rate for one country code.
    pub fn with_rate(mut self, country_code: &str, rate: TaxRate) -> Self {
        self.rates.insert(country_code.to_uppercase(), rate);
        self
    }

    /// Returns the rate applied to customers in a country.
    pub fn rate_for(&self, country_code: &str) -> TaxRate {
        self.rates
            .get(&country_code.to_uppercase())
            .copied()
            .unwrap_or(self.default_rate)
    }
}

impl TaxPolicy for TaxService {
    fn tax_for(&self, customer: &Customer, product: &Product, quantity: u32) -> Money {
        self.rate_for(&customer.country.code)
            .apply(product.price.multiply(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Country;

    fn customer_in(code: &str) -> Customer {
        let country = Country::create(code, code).unwrap();
        Customer::create("Ann", "Smith", "ann@example.com", country)
            .unwrap()
            .0
    }

    #[test]
    fn test_rate_lookup_falls_back_to_default() {
        let tax = TaxService::new(TaxRate::from_percent(10)).with_rate("uk", TaxRate::from_percent(20));
        assert_eq!(tax.rate_for("UK").basis_points(), 2000);
        assert_eq!(tax.rate_for("FR").basis_points(), 1000);
    }

    #[test]
    fn test_tax_depends_on_customer_country() {
        let tax = TaxService::new(TaxRate::zero()).with_rate("UK", TaxRate::from_percent(20));
        let (product, _) = Product::create("SKU-1", "Widget", Money::from_cents(1000)).unwrap();

        assert_eq!(tax.tax_for(&customer_in("UK"), &product, 3).cents(), 600);
        assert_eq!(tax.tax_for(&customer_in("US"), &product, 3).cents(), 0);
    }
}
