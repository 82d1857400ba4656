//! In-process domain event dispatch.
//!
//! - [`DomainEvent`] trait for typed, immutable facts
//! - [`DomainEvents`] registry built once at start-up and raised synchronously
//! - [`callbacks`] for task-scoped ad-hoc observers used by tests
//! - [`DomainEventHandle`] writing a [`DomainEventRecord`] per dispatched event
//! - [`correlation`] providers stamping records with the request's id

pub mod bus;
pub mod callbacks;
pub mod correlation;
pub mod error;
pub mod event;
pub mod handle;
pub mod handler;
pub mod record;

pub use bus::{DomainEvents, DomainEventsBuilder};
pub use correlation::{CorrelationIdProvider, FixedCorrelation, TaskCorrelation};
pub use error::HandlerError;
pub use event::DomainEvent;
pub use handle::DomainEventHandle;
pub use handler::{DispatchContext, EventHandler};
pub use record::{CorrelatedRecordsSpec, DomainEventRecord, EventTypeSpec};
