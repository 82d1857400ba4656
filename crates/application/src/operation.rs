//! The unit-of-work scope of one service operation.

use std::sync::Arc;

use domain::ShopEvent;
use event_bus::{DispatchContext, DomainEventRecord, DomainEvents};
use persistence::{Entity, Repository, UnitOfWork, UnitOfWorkFactory};

use crate::Result;

/// One operation's unit of work plus the bus its events are raised on.
///
/// Events raised here are dispatched immediately, and handlers stage their
/// writes on the same unit of work. [`Operation::commit`] consumes the
/// operation, so it commits at most once; dropping it discards every staged
/// change.
pub(crate) struct Operation<U: UnitOfWork> {
    uow: U,
    bus: Arc<DomainEvents<ShopEvent>>,
    records: Box<dyn Repository<DomainEventRecord>>,
}

impl<U: UnitOfWork> Operation<U> {
    /// Begins a unit of work.
    pub(crate) fn begin<F>(factory: &F, bus: &Arc<DomainEvents<ShopEvent>>) -> Self
    where
        F: UnitOfWorkFactory<UnitOfWork = U>,
    {
        let uow = factory.begin();
        let records = uow.repository::<DomainEventRecord>();
        Self {
            uow,
            bus: Arc::clone(bus),
            records,
        }
    }

    /// Returns a repository staging on this operation's unit of work.
    pub(crate) fn repository<T: Entity>(&self) -> Box<dyn Repository<T>> {
        self.uow.repository::<T>()
    }

    /// Dispatches an event to the registered handlers.
    pub(crate) async fn raise(&self, event: ShopEvent) -> Result<()> {
        let ctx = DispatchContext::new(self.records.as_ref());
        self.bus.raise(&event, &ctx).await?;
        Ok(())
    }

    /// Commits every staged change, including handler writes.
    pub(crate) async fn commit(self) -> Result<()> {
        self.uow.commit().await?;
        Ok(())
    }
}
