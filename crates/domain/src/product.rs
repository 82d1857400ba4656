//! Catalog products.

use chrono::{DateTime, Utc};
use common::ProductId;
use persistence::{Entity, UniqueKey};
use serde::{Deserialize, Serialize};

use crate::error::required;
use crate::events::ProductCreatedData;
use crate::{Money, ShopEvent, ValidationError};

/// A product in the catalog. Carts only ever read products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Unique catalog code.
    pub code: String,
    pub name: String,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product.
    pub fn create(
        code: &str,
        name: &str,
        price: Money,
    ) -> Result<(Self, ShopEvent), ValidationError> {
        if price.is_negative() {
            return Err(ValidationError::InvalidPrice {
                cents: price.cents(),
            });
        }

        let product = Self {
            id: ProductId::new(),
            code: required("code", code)?,
            name: required("name", name)?,
            price,
            created_at: Utc::now(),
        };
        let event = ShopEvent::ProductCreated(ProductCreatedData {
            product_id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            price,
        });
        Ok((product, event))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn entity_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("product_code", self.code.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product() {
        let (product, event) = Product::create("SKU-1", "Widget", Money::from_cents(1000)).unwrap();
        assert_eq!(product.code, "SKU-1");
        match event {
            ShopEvent::ProductCreated(data) => {
                assert_eq!(data.product_id, product.id);
                assert_eq!(data.price.cents(), 1000);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_fails() {
        let result = Product::create("SKU-1", "Widget", Money::from_cents(-1));
        assert!(matches!(result, Err(ValidationError::InvalidPrice { cents: -1 })));
    }
}
