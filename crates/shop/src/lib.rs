//! Composition root for the shop core.
//!
//! Wires the event bus, the event-record handler, the domain services, and the
//! application services over one storage collaborator, and bootstraps logging
//! and metrics for the binary.

pub mod config;
pub mod demo;
pub mod error;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use application::{CartService, CatalogService, CustomerService, HistoryService};
use common::CorrelationId;
use domain::{CheckoutService, ShopEvent};
use event_bus::{
    CorrelationIdProvider, DomainEventHandle, DomainEvents, TaskCorrelation, correlation,
};
use persistence::UnitOfWorkFactory;

pub use config::{LogFormat, ShopConfig};
pub use error::ConfigError;

/// Builds the event bus with the event-record handler registered for every
/// shop event type.
pub fn build_event_bus(correlation: Arc<dyn CorrelationIdProvider>) -> DomainEvents<ShopEvent> {
    DomainEvents::<ShopEvent>::builder()
        .register_all(
            &ShopEvent::ALL_TYPES,
            Arc::new(DomainEventHandle::new(correlation)),
        )
        .build()
}

/// Runs a future as one request with a fresh correlation id.
pub async fn in_request<Fut: Future>(future: Fut) -> (CorrelationId, Fut::Output) {
    let id = CorrelationId::new();
    let output = correlation::scope(id, future).await;
    (id, output)
}

/// The application services over one storage collaborator.
pub struct Shop<F: UnitOfWorkFactory> {
    pub carts: CartService<F>,
    pub customers: CustomerService<F>,
    pub catalog: CatalogService<F>,
    pub history: HistoryService<F>,
    bus: Arc<DomainEvents<ShopEvent>>,
}

impl<F: UnitOfWorkFactory + Clone> Shop<F> {
    /// Wires the services from configuration.
    pub fn new(factory: F, config: &ShopConfig) -> Self {
        let bus = Arc::new(build_event_bus(Arc::new(TaskCorrelation)));
        tracing::info!(
            handlers = ShopEvent::ALL_TYPES
                .iter()
                .map(|t| bus.handler_count(t))
                .sum::<usize>(),
            default_tax = %config.default_tax,
            "shop wired"
        );

        Self {
            carts: CartService::new(
                factory.clone(),
                Arc::clone(&bus),
                Arc::new(config.tax_service()),
                CheckoutService::new(config.checkout_policy()),
            ),
            customers: CustomerService::new(factory.clone(), Arc::clone(&bus)),
            catalog: CatalogService::new(factory.clone(), Arc::clone(&bus)),
            history: HistoryService::new(factory, Arc::clone(&bus)),
            bus,
        }
    }

    /// Returns the shared event bus.
    pub fn bus(&self) -> &DomainEvents<ShopEvent> {
        &self.bus
    }
}
