//! Customer registration and account management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{CountryId, CustomerId};
use domain::{
    Cart, Country, CreditCard, Customer, CustomerAlreadyRegisteredSpec, CustomerBulkIdFindSpec,
    CustomerCartSpec, CustomerPurchasesSpec, CustomerRegisteredSpec, Money, Purchase, PurchasedNProductsSpec,
    ShopEvent, ValidationError,
};
use event_bus::DomainEvents;
use persistence::{RepositoryExt, Specification, UnitOfWorkFactory};
use serde::Deserialize;

use crate::operation::Operation;
use crate::{ApplicationError, CreditCardView, CustomerPurchaseHistory, CustomerView, Result};

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country_id: CountryId,
}

/// Credit card details supplied by a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreditCard {
    pub name_on_card: String,
    pub card_number: String,
    pub expiry: DateTime<Utc>,
}

/// Service for customer accounts.
pub struct CustomerService<F: UnitOfWorkFactory> {
    factory: F,
    bus: Arc<DomainEvents<ShopEvent>>,
}

impl<F: UnitOfWorkFactory> CustomerService<F> {
    /// Creates a new customer service.
    pub fn new(factory: F, bus: Arc<DomainEvents<ShopEvent>>) -> Self {
        Self { factory, bus }
    }

    /// Returns true if no customer uses the email, ignoring case.
    #[tracing::instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let op = Operation::begin(&self.factory, &self.bus);
        let taken = op
            .repository::<Customer>()
            .exists(&CustomerAlreadyRegisteredSpec::new(email))
            .await?;
        Ok(!taken)
    }

    /// Registers a customer living in a known country.
    #[tracing::instrument(skip(self))]
    pub async fn register_customer(&self, request: NewCustomer) -> Result<CustomerView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let customers = op.repository::<Customer>();

        if customers
            .exists(&CustomerAlreadyRegisteredSpec::new(&request.email))
            .await?
        {
            return Err(ValidationError::DuplicateEmail {
                email: request.email,
            }
            .into());
        }
        let country = op
            .repository::<Country>()
            .find_by_id(&request.country_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Country", request.country_id))?;

        let (customer, event) = Customer::create(
            &request.first_name,
            &request.last_name,
            &request.email,
            country,
        )?;
        op.raise(event).await?;
        customers.add(&customer).await?;
        op.commit().await?;

        metrics::counter!("customer_operations_total", "operation" => "register").increment(1);
        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(CustomerView::from(&customer))
    }

    /// Changes a customer's email address.
    #[tracing::instrument(skip(self))]
    pub async fn change_email(&self, customer_id: CustomerId, email: &str) -> Result<CustomerView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let customers = op.repository::<Customer>();
        let mut customer = customers
            .find_one(&CustomerRegisteredSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", customer_id))?;

        let taken_by_other = CustomerAlreadyRegisteredSpec::new(email)
            .and(CustomerRegisteredSpec(customer_id).not());
        if customers.exists(&taken_by_other).await? {
            return Err(ValidationError::DuplicateEmail {
                email: email.to_string(),
            }
            .into());
        }

        if let Some(event) = customer.change_email(email)? {
            op.raise(event).await?;
            customers.update(&customer).await?;
            op.commit().await?;
            metrics::counter!("customer_operations_total", "operation" => "change_email")
                .increment(1);
        }
        Ok(CustomerView::from(&customer))
    }

    /// Returns a customer.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: CustomerId) -> Result<CustomerView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let customer = op
            .repository::<Customer>()
            .find_one(&CustomerRegisteredSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", customer_id))?;
        Ok(CustomerView::from(&customer))
    }

    /// Removes a customer.
    #[tracing::instrument(skip(self))]
    pub async fn remove_customer(&self, customer_id: CustomerId) -> Result<()> {
        let op = Operation::begin(&self.factory, &self.bus);
        let customers = op.repository::<Customer>();
        let customer = customers
            .find_one(&CustomerRegisteredSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", customer_id))?;

        // The open cart goes with the customer.
        let carts = op.repository::<Cart>();
        if let Some(cart) = carts.find_one(&CustomerCartSpec(customer_id)).await? {
            carts.remove(&cart).await?;
        }

        op.raise(customer.remove()).await?;
        customers.remove(&customer).await?;
        op.commit().await?;

        metrics::counter!("customer_operations_total", "operation" => "remove").increment(1);
        Ok(())
    }

    /// Adds a credit card to a customer.
    #[tracing::instrument(skip(self, card))]
    pub async fn add_credit_card(
        &self,
        customer_id: CustomerId,
        card: NewCreditCard,
    ) -> Result<CreditCardView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let customers = op.repository::<Customer>();
        let mut customer = customers
            .find_one(&CustomerRegisteredSpec(customer_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Customer", customer_id))?;

        let card = CreditCard::create(&card.name_on_card, &card.card_number, card.expiry)?;
        let view = CreditCardView::from(&card);
        op.raise(customer.add_credit_card(card)).await?;
        customers.update(&customer).await?;
        op.commit().await?;

        metrics::counter!("customer_operations_total", "operation" => "add_credit_card")
            .increment(1);
        Ok(view)
    }

    /// Returns purchase totals for every customer who bought something.
    ///
    /// Customers are listed in registration order.
    #[tracing::instrument(skip(self))]
    pub async fn purchase_history(&self) -> Result<Vec<CustomerPurchaseHistory>> {
        let op = Operation::begin(&self.factory, &self.bus);
        let purchases = op.repository::<Purchase>();

        let buyers: CustomerBulkIdFindSpec = purchases
            .find_all(&PurchasedNProductsSpec(1))
            .await?
            .into_iter()
            .map(|purchase| purchase.customer_id)
            .collect();
        let customers = op.repository::<Customer>().find_all(&buyers).await?;

        let mut history = Vec::with_capacity(customers.len());
        for customer in customers {
            let bought = purchases
                .find_all(&CustomerPurchasesSpec(customer.id))
                .await?;
            history.push(CustomerPurchaseHistory {
                customer_id: customer.id,
                first_name: customer.first_name,
                last_name: customer.last_name,
                email: customer.email,
                total_purchases: bought.len(),
                total_products_purchased: bought
                    .iter()
                    .fold(0, |total, p| total.saturating_add(p.products_purchased())),
                total_cost: bought.iter().map(Purchase::total_cost).sum::<Money>(),
            });
        }
        Ok(history)
    }
}
