//! Customers and their payment methods.

use chrono::{DateTime, Utc};
use common::{CreditCardId, CustomerId};
use persistence::{Entity, UniqueKey};
use serde::{Deserialize, Serialize};

use crate::error::required;
use crate::events::{
    CreditCardAddedData, CustomerChangedEmailData, CustomerCreatedData, CustomerRemovedData,
};
use crate::{Country, ShopEvent, ValidationError};

/// A credit card owned by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: CreditCardId,
    pub name_on_card: String,
    pub card_number: String,
    pub expiry: DateTime<Utc>,
    pub active: bool,
}

impl CreditCard {
    /// Creates an active card. The number may contain spaces or dashes.
    pub fn create(
        name_on_card: &str,
        card_number: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name_on_card = required("name_on_card", name_on_card)?;
        let digits: String = card_number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCard {
                reason: "card number must be 12 to 19 digits",
            });
        }

        Ok(Self {
            id: CreditCardId::new(),
            name_on_card,
            card_number: digits,
            expiry,
            active: true,
        })
    }

    /// Returns true if the card can pay at the given instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expiry > now
    }

    /// Returns the card number with all but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let visible = self.card_number.len().saturating_sub(4);
        format!("{}{}", "*".repeat(visible), &self.card_number[visible..])
    }
}

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Snapshot of the country at registration.
    pub country: Country,
    pub credit_cards: Vec<CreditCard>,
    pub created_at: DateTime<Utc>,
}

// Command methods (return events)
impl Customer {
    /// Registers a new customer.
    ///
    /// Email uniqueness is a cross-customer rule and is checked by the caller.
    pub fn create(
        first_name: &str,
        last_name: &str,
        email: &str,
        country: Country,
    ) -> Result<(Self, ShopEvent), ValidationError> {
        let customer = Self {
            id: CustomerId::new(),
            first_name: required("first_name", first_name)?,
            last_name: required("last_name", last_name)?,
            email: validate_email(email)?,
            country,
            credit_cards: Vec::new(),
            created_at: Utc::now(),
        };
        let event = ShopEvent::CustomerCreated(CustomerCreatedData {
            customer_id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            country_code: customer.country.code.clone(),
            created_at: customer.created_at,
        });
        Ok((customer, event))
    }

    /// Changes the email address.
    ///
    /// Returns `None` when the address is unchanged.
    pub fn change_email(&mut self, email: &str) -> Result<Option<ShopEvent>, ValidationError> {
        let email = validate_email(email)?;
        if email == self.email {
            return Ok(None);
        }

        let old_email = std::mem::replace(&mut self.email, email);
        Ok(Some(ShopEvent::CustomerChangedEmail(
            CustomerChangedEmailData {
                customer_id: self.id,
                old_email,
                new_email: self.email.clone(),
            },
        )))
    }

    /// Adds a payment method.
    pub fn add_credit_card(&mut self, card: CreditCard) -> ShopEvent {
        let event = ShopEvent::CreditCardAdded(CreditCardAddedData {
            customer_id: self.id,
            credit_card_id: card.id,
            masked_number: card.masked_number(),
            expiry: card.expiry,
        });
        self.credit_cards.push(card);
        event
    }

    /// Produces the event announcing this customer's removal.
    pub fn remove(&self) -> ShopEvent {
        ShopEvent::CustomerRemoved(CustomerRemovedData {
            customer_id: self.id,
            email: self.email.clone(),
        })
    }
}

// Query methods
impl Customer {
    /// Returns "first last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if any card can pay at the given instant.
    pub fn has_valid_payment_method(&self, now: DateTime<Utc>) -> bool {
        self.credit_cards.iter().any(|card| card.is_valid_at(now))
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn entity_type() -> &'static str {
        "Customer"
    }

    fn id(&self) -> &CustomerId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("customer_email", self.email.to_lowercase())]
    }
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = required("email", email)?;
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(ValidationError::InvalidEmail { email });
    }
    Ok(email)
}
