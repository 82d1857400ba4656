//! Checkout eligibility and execution.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::CustomerCheckedOutData;
use crate::{Cart, Customer, Purchase, ShopEvent};

/// Why a cart cannot be checked out.
///
/// Issues are ordinary outcomes reported to the customer, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckOutIssue {
    /// The cart has no lines.
    EmptyCart,

    /// The customer has no active, unexpired credit card.
    NoValidPaymentMethod,

    /// The shop does not ship to the customer's country.
    InvalidShippingCountry,

    /// The cart was already checked out.
    CartAlreadyCheckedOut,
}

impl std::fmt::Display for CheckOutIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutIssue::EmptyCart => write!(f, "cart is empty"),
            CheckOutIssue::NoValidPaymentMethod => write!(f, "no valid payment method"),
            CheckOutIssue::InvalidShippingCountry => write!(f, "cannot ship to this country"),
            CheckOutIssue::CartAlreadyCheckedOut => write!(f, "cart already checked out"),
        }
    }
}

/// Shop-wide checkout rules.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPolicy {
    /// Country codes the shop ships to. `None` ships anywhere.
    pub shipping_countries: Option<HashSet<String>>,
}

impl CheckoutPolicy {
    /// Ships anywhere.
    pub fn anywhere() -> Self {
        Self::default()
    }

    /// Ships only to the given country codes.
    pub fn ship_to<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            shipping_countries: Some(
                codes
                    .into_iter()
                    .map(|code| code.as_ref().trim().to_uppercase())
                    .collect(),
            ),
        }
    }

    /// Returns true if the shop ships to the country code.
    pub fn ships_to(&self, country_code: &str) -> bool {
        match &self.shipping_countries {
            Some(codes) => codes.contains(&country_code.to_uppercase()),
            None => true,
        }
    }
}

/// Decides whether a cart may be checked out and turns it into a purchase.
#[derive(Debug, Clone, Default)]
pub struct CheckoutService {
    policy: CheckoutPolicy,
}

impl CheckoutService {
    /// Creates a service enforcing the given policy.
    pub fn new(policy: CheckoutPolicy) -> Self {
        Self { policy }
    }

    /// Returns the first issue preventing checkout, if any.
    pub fn can_check_out(
        &self,
        customer: &Customer,
        cart: &Cart,
        now: DateTime<Utc>,
    ) -> Option<CheckOutIssue> {
        if !cart.is_open() {
            return Some(CheckOutIssue::CartAlreadyCheckedOut);
        }
        if cart.is_empty() {
            return Some(CheckOutIssue::EmptyCart);
        }
        if !self.policy.ships_to(&customer.country.code) {
            return Some(CheckOutIssue::InvalidShippingCountry);
        }
        if !customer.has_valid_payment_method(now) {
            return Some(CheckOutIssue::NoValidPaymentMethod);
        }
        None
    }

    /// Snapshots the cart into a purchase and closes the cart.
    ///
    /// Re-checks eligibility; on an issue the cart is left untouched.
    pub fn checkout(
        &self,
        customer: &Customer,
        cart: &mut Cart,
        now: DateTime<Utc>,
    ) -> Result<(Purchase, ShopEvent), CheckOutIssue> {
        if let Some(issue) = self.can_check_out(customer, cart, now) {
            return Err(issue);
        }

        let purchase = Purchase::from_cart(cart, now);
        cart.close(purchase.id)
            .map_err(|_| CheckOutIssue::CartAlreadyCheckedOut)?;

        tracing::debug!(
            purchase_id = %purchase.id,
            cart_id = %cart.id,
            total_cost = %purchase.total_cost(),
            "cart checked out"
        );

        let event = ShopEvent::CustomerCheckedOut(CustomerCheckedOutData {
            purchase_id: purchase.id,
            cart_id: cart.id,
            customer_id: customer.id,
            products_purchased: purchase.products_purchased(),
            total_tax: purchase.total_tax(),
            total_cost: purchase.total_cost(),
            checked_out_at: now,
        });
        Ok((purchase, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Country, CreditCard, Money, Product, TaxRate, TaxService};
    use chrono::Duration;

    fn customer_in(code: &str, with_card: bool) -> Customer {
        let country = Country::create(code, code).unwrap();
        let (mut customer, _) =
            Customer::create("Ann", "Smith", "ann@example.com", country).unwrap();
        if with_card {
            let card = CreditCard::create(
                "Ann Smith",
                "4111111111111111",
                Utc::now() + Duration::days(365),
            )
            .unwrap();
            customer.add_credit_card(card);
        }
        customer
    }

    fn filled_cart(customer: &Customer) -> Cart {
        let (product, _) = Product::create("SKU-1", "Widget", Money::from_cents(1000)).unwrap();
        let (mut cart, _) = Cart::create(customer);
        cart.add_product(customer, &product, 2, &TaxService::new(TaxRate::from_percent(20)))
            .unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let customer = customer_in("UK", true);
        let (cart, _) = Cart::create(&customer);
        let service = CheckoutService::default();
        assert_eq!(
            service.can_check_out(&customer, &cart, Utc::now()),
            Some(CheckOutIssue::EmptyCart)
        );
    }

    #[test]
    fn test_missing_payment_method_is_refused() {
        let customer = customer_in("UK", false);
        let cart = filled_cart(&customer);
        let service = CheckoutService::default();
        assert_eq!(
            service.can_check_out(&customer, &cart, Utc::now()),
            Some(CheckOutIssue::NoValidPaymentMethod)
        );
    }

    #[test]
    fn test_shipping_country_is_enforced() {
        let customer = customer_in("FR", true);
        let cart = filled_cart(&customer);
        let service = CheckoutService::new(CheckoutPolicy::ship_to(["uk", "IE"]));
        assert_eq!(
            service.can_check_out(&customer, &cart, Utc::now()),
            Some(CheckOutIssue::InvalidShippingCountry)
        );
    }

    #[test]
    fn test_checkout_snapshots_cart_and_closes_it() {
        let customer = customer_in("UK", true);
        let mut cart = filled_cart(&customer);
        let service = CheckoutService::new(CheckoutPolicy::ship_to(["UK"]));

        let (purchase, event) = service.checkout(&customer, &mut cart, Utc::now()).unwrap();

        assert_eq!(purchase.cart_id, cart.id);
        assert_eq!(purchase.products().len(), 1);
        assert_eq!(purchase.products()[0].quantity, 2);
        assert_eq!(purchase.products()[0].cost.cents(), 2000);
        assert_eq!(purchase.total_tax().cents(), 400);
        assert_eq!(purchase.total_cost().cents(), 2400);
        assert_eq!(cart.closed_by(), Some(purchase.id));
        match event {
            ShopEvent::CustomerCheckedOut(data) => {
                assert_eq!(data.purchase_id, purchase.id);
                assert_eq!(data.products_purchased, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_second_checkout_is_refused() {
        let customer = customer_in("UK", true);
        let mut cart = filled_cart(&customer);
        let service = CheckoutService::default();
        service.checkout(&customer, &mut cart, Utc::now()).unwrap();

        let result = service.checkout(&customer, &mut cart, Utc::now());
        assert_eq!(result.unwrap_err(), CheckOutIssue::CartAlreadyCheckedOut);
    }
}
