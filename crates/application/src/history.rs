//! Read access to recorded domain events.

use std::sync::Arc;

use common::CorrelationId;
use domain::ShopEvent;
use event_bus::{CorrelatedRecordsSpec, DomainEventRecord, DomainEvents, EventTypeSpec};
use persistence::{RepositoryExt, Specification, UnitOfWorkFactory};

use crate::Result;
use crate::operation::Operation;

/// Selects event records. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub correlation_id: Option<CorrelationId>,
    pub event_type: Option<String>,
}

impl EventFilter {
    /// Records produced by one request.
    pub fn correlated(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            event_type: None,
        }
    }

    /// Narrows the filter to one event type.
    pub fn of_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }
}

impl Specification<DomainEventRecord> for EventFilter {
    fn is_satisfied_by(&self, record: &DomainEventRecord) -> bool {
        let correlated = self
            .correlation_id
            .is_none_or(|id| CorrelatedRecordsSpec(id).is_satisfied_by(record));
        let typed = self
            .event_type
            .as_ref()
            .is_none_or(|t| EventTypeSpec::new(t.as_str()).is_satisfied_by(record));
        correlated && typed
    }
}

/// Service listing the event history.
pub struct HistoryService<F: UnitOfWorkFactory> {
    factory: F,
    bus: Arc<DomainEvents<ShopEvent>>,
}

impl<F: UnitOfWorkFactory> HistoryService<F> {
    /// Creates a new history service.
    pub fn new(factory: F, bus: Arc<DomainEvents<ShopEvent>>) -> Self {
        Self { factory, bus }
    }

    /// Returns matching records in the order they were dispatched.
    #[tracing::instrument(skip(self))]
    pub async fn events(&self, filter: EventFilter) -> Result<Vec<DomainEventRecord>> {
        let op = Operation::begin(&self.factory, &self.bus);
        let records = op
            .repository::<DomainEventRecord>()
            .find_all(&filter)
            .await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::DomainEvent;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct Noted;

    impl DomainEvent for Noted {
        fn event_type(&self) -> &'static str {
            "Noted"
        }
    }

    #[test]
    fn filter_matches_on_every_set_field() {
        let id = CorrelationId::new();
        let record = DomainEventRecord::capture(&Noted, id).unwrap();

        assert!(EventFilter::default().is_satisfied_by(&record));
        assert!(EventFilter::correlated(id).is_satisfied_by(&record));
        assert!(EventFilter::correlated(id).of_type("Noted").is_satisfied_by(&record));
        assert!(!EventFilter::correlated(id).of_type("Other").is_satisfied_by(&record));
        assert!(!EventFilter::correlated(CorrelationId::new()).is_satisfied_by(&record));
    }
}
