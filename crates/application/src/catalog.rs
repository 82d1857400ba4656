//! Catalog reference data: countries and products.

use std::sync::Arc;

use common::ProductId;
use domain::{Country, CountryCodeSpec, Money, Product, ProductCodeSpec, ShopEvent, ValidationError};
use event_bus::DomainEvents;
use persistence::{All, RepositoryExt, UnitOfWorkFactory};

use crate::operation::Operation;
use crate::{ApplicationError, CountryView, ProductView, Result};

/// Service maintaining countries and products.
pub struct CatalogService<F: UnitOfWorkFactory> {
    factory: F,
    bus: Arc<DomainEvents<ShopEvent>>,
}

impl<F: UnitOfWorkFactory> CatalogService<F> {
    /// Creates a new catalog service.
    pub fn new(factory: F, bus: Arc<DomainEvents<ShopEvent>>) -> Self {
        Self { factory, bus }
    }

    /// Adds a country with a unique code.
    #[tracing::instrument(skip(self))]
    pub async fn add_country(&self, code: &str, name: &str) -> Result<CountryView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let country = Country::create(code, name)?;
        let countries = op.repository::<Country>();
        if countries
            .exists(&CountryCodeSpec(country.code.clone()))
            .await?
        {
            return Err(ValidationError::DuplicateCountryCode { code: country.code }.into());
        }
        countries.add(&country).await?;
        op.commit().await?;
        Ok(CountryView::from(&country))
    }

    /// Adds a product with a unique code.
    #[tracing::instrument(skip(self))]
    pub async fn add_product(&self, code: &str, name: &str, price: Money) -> Result<ProductView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let products = op.repository::<Product>();
        if products
            .exists(&ProductCodeSpec(code.trim().to_string()))
            .await?
        {
            return Err(ValidationError::DuplicateProductCode {
                code: code.trim().to_string(),
            }
            .into());
        }

        let (product, event) = Product::create(code, name, price)?;
        op.raise(event).await?;
        products.add(&product).await?;
        op.commit().await?;

        metrics::counter!("catalog_products_added_total").increment(1);
        Ok(ProductView::from(&product))
    }

    /// Returns a product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<ProductView> {
        let op = Operation::begin(&self.factory, &self.bus);
        let product = op
            .repository::<Product>()
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", product_id))?;
        Ok(ProductView::from(&product))
    }

    /// Lists every product in the order they were added.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductView>> {
        let op = Operation::begin(&self.factory, &self.bus);
        let products = op.repository::<Product>().find_all(&All).await?;
        Ok(products.iter().map(ProductView::from).collect())
    }
}
