//! Event handler trait and the per-dispatch context.

use async_trait::async_trait;
use persistence::Repository;

use crate::{DomainEvent, DomainEventRecord, HandlerError};

/// Collaborators scoped to the unit of work that raised the event.
///
/// Repositories live as long as one unit of work while handlers live as long
/// as the process, so the dispatching operation lends its repositories to the
/// handlers for the duration of one raise.
pub struct DispatchContext<'a> {
    records: &'a dyn Repository<DomainEventRecord>,
}

impl<'a> DispatchContext<'a> {
    /// Creates a context lending the given event-record repository.
    pub fn new(records: &'a dyn Repository<DomainEventRecord>) -> Self {
        Self { records }
    }

    /// Returns the event-record repository of the dispatching unit of work.
    pub fn records(&self) -> &'a dyn Repository<DomainEventRecord> {
        self.records
    }
}

/// A handler bound to one or more event types.
#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// Returns the handler name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Handles one event. Errors abort the dispatch.
    async fn handle(&self, event: &E, ctx: &DispatchContext<'_>) -> Result<(), HandlerError>;
}
