//! Handler registry and synchronous dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{DispatchContext, DomainEvent, EventHandler, HandlerError, callbacks};

/// The domain event bus.
///
/// Handlers are registered once through [`DomainEventsBuilder`] and the bus is
/// immutable afterwards, so it can be shared freely between requests. A raise
/// runs the handlers registered for the event's type in registration order,
/// then the task-scoped [`callbacks`]. The first handler error aborts the
/// dispatch and is returned to the caller.
pub struct DomainEvents<E: DomainEvent> {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> DomainEvents<E> {
    /// Starts building a bus.
    pub fn builder() -> DomainEventsBuilder<E> {
        DomainEventsBuilder {
            handlers: HashMap::new(),
        }
    }

    /// Creates a bus with no handlers. Raises still reach callbacks.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Returns the number of handlers registered for an event type.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// Returns the names of the handlers registered for an event type, in order.
    pub fn handler_names(&self, event_type: &str) -> Vec<&'static str> {
        self.handlers
            .get(event_type)
            .map(|handlers| handlers.iter().map(|h| h.name()).collect())
            .unwrap_or_default()
    }

    /// Dispatches one event synchronously.
    ///
    /// Completes only after every handler and callback has run.
    #[tracing::instrument(skip(self, event, ctx), fields(event_type = event.event_type()))]
    pub async fn raise(&self, event: &E, ctx: &DispatchContext<'_>) -> Result<(), HandlerError> {
        let event_type = event.event_type();
        metrics::counter!("domain_events_raised_total", "event_type" => event_type).increment(1);

        if let Some(handlers) = self.handlers.get(event_type) {
            for handler in handlers {
                if let Err(e) = handler.handle(event, ctx).await {
                    metrics::counter!(
                        "domain_event_handler_failures_total",
                        "event_type" => event_type,
                        "handler" => handler.name()
                    )
                    .increment(1);
                    tracing::warn!(handler = handler.name(), error = %e, "event handler failed");
                    return Err(e);
                }
            }
        }

        callbacks::invoke(event);
        Ok(())
    }
}

impl<E: DomainEvent> Default for DomainEvents<E> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collects handler registrations for a [`DomainEvents`] bus.
pub struct DomainEventsBuilder<E: DomainEvent> {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> DomainEventsBuilder<E> {
    /// Registers a handler for one event type.
    pub fn register(mut self, event_type: &'static str, handler: Arc<dyn EventHandler<E>>) -> Self {
        self.handlers.entry(event_type).or_default().push(handler);
        self
    }

    /// Registers the same handler for several event types.
    pub fn register_all(
        mut self,
        event_types: &[&'static str],
        handler: Arc<dyn EventHandler<E>>,
    ) -> Self {
        for event_type in event_types {
            self = self.register(*event_type, Arc::clone(&handler));
        }
        self
    }

    /// Finishes registration.
    pub fn build(self) -> DomainEvents<E> {
        let registered: usize = self.handlers.values().map(Vec::len).sum();
        tracing::debug!(registered, "domain event bus built");
        DomainEvents {
            handlers: self.handlers,
        }
    }
}
