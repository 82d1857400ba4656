//! Generic handler persisting every event it receives.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    CorrelationIdProvider, DispatchContext, DomainEvent, DomainEventRecord, EventHandler,
    HandlerError,
};

/// Appends a [`DomainEventRecord`] for each handled event.
///
/// Register one instance under every event type that should be kept in the
/// event history. The record is staged on the dispatching unit of work, so it
/// becomes durable together with the rest of the operation or not at all.
#[derive(Clone)]
pub struct DomainEventHandle {
    correlation: Arc<dyn CorrelationIdProvider>,
}

impl DomainEventHandle {
    /// Creates a handle stamping records with ids from `correlation`.
    pub fn new(correlation: Arc<dyn CorrelationIdProvider>) -> Self {
        Self { correlation }
    }
}

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for DomainEventHandle {
    fn name(&self) -> &'static str {
        "DomainEventHandle"
    }

    async fn handle(&self, event: &E, ctx: &DispatchContext<'_>) -> Result<(), HandlerError> {
        let record = DomainEventRecord::capture(event, self.correlation.correlation_id())?;
        tracing::debug!(
            event_type = %record.event_type,
            correlation_id = %record.correlation_id,
            "recording domain event"
        );
        ctx.records().add(&record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedCorrelation, TaskCorrelation, correlation};
    use common::CorrelationId;
    use persistence::{InMemoryStore, RepositoryExt, UnitOfWork, UnitOfWorkFactory, spec_fn};
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct Shipped {
        parcel: String,
    }

    impl DomainEvent for Shipped {
        fn event_type(&self) -> &'static str {
            "Shipped"
        }
    }

    #[tokio::test]
    async fn stages_record_with_correlation_id() {
        let store = InMemoryStore::new();
        let uow = store.begin();
        let records = uow.repository::<DomainEventRecord>();
        let ctx = DispatchContext::new(records.as_ref());

        let id = CorrelationId::new();
        let handle = DomainEventHandle::new(Arc::new(FixedCorrelation(id)));
        let event = Shipped {
            parcel: "P-1".to_string(),
        };
        handle.handle(&event, &ctx).await.unwrap();

        let staged = records
            .find_all(&spec_fn(|_: &DomainEventRecord| true))
            .await
            .unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].event_type, "Shipped");
        assert_eq!(staged[0].correlation_id, id);
        assert_eq!(staged[0].payload["parcel"], "P-1");

        assert_eq!(store.row_count("DomainEventRecord").await, 0);
        uow.commit().await.unwrap();
        assert_eq!(store.row_count("DomainEventRecord").await, 1);
    }

    #[tokio::test]
    async fn task_correlation_follows_request_scope() {
        let store = InMemoryStore::new();
        let uow = store.begin();
        let records = uow.repository::<DomainEventRecord>();
        let handle = DomainEventHandle::new(Arc::new(TaskCorrelation));

        let id = CorrelationId::new();
        correlation::scope(id, async {
            let ctx = DispatchContext::new(records.as_ref());
            let event = Shipped {
                parcel: "P-2".to_string(),
            };
            handle.handle(&event, &ctx).await.unwrap();
        })
        .await;

        let staged = records
            .find_all(&spec_fn(|_: &DomainEventRecord| true))
            .await
            .unwrap();
        assert_eq!(staged[0].correlation_id, id);
    }
}
