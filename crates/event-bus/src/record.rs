//! Durable projection of dispatched events.

use chrono::{DateTime, Utc};
use common::{CorrelationId, EventId};
use persistence::{Entity, Specification};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::DomainEvent;

/// An append-only record of a dispatched domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEventRecord {
    /// Unique identifier for this record.
    pub id: EventId,

    /// The event type tag (e.g. "CartCreated").
    pub event_type: String,

    /// Correlation id of the request that raised the event.
    pub correlation_id: CorrelationId,

    /// When the event was dispatched.
    pub occurred_at: DateTime<Utc>,

    /// The event itself as JSON.
    pub payload: serde_json::Value,
}

impl DomainEventRecord {
    /// Captures an event, stamping it with the given correlation id.
    pub fn capture<E: DomainEvent>(
        event: &E,
        correlation_id: CorrelationId,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: EventId::new(),
            event_type: event.event_type().to_string(),
            correlation_id,
            occurred_at: Utc::now(),
            payload: serde_json::to_value(event)?,
        })
    }

    /// Decodes the payload back into an event type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

impl Entity for DomainEventRecord {
    type Id = EventId;

    fn entity_type() -> &'static str {
        "DomainEventRecord"
    }

    fn id(&self) -> &EventId {
        &self.id
    }
}

/// Records produced by one request.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedRecordsSpec(pub CorrelationId);

impl Specification<DomainEventRecord> for CorrelatedRecordsSpec {
    fn is_satisfied_by(&self, candidate: &DomainEventRecord) -> bool {
        candidate.correlation_id == self.0
    }
}

/// Records of one event type.
#[derive(Debug, Clone)]
pub struct EventTypeSpec(pub String);

impl EventTypeSpec {
    /// Creates a spec matching the given event type tag.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self(event_type.into())
    }
}

impl Specification<DomainEventRecord> for EventTypeSpec {
    fn is_satisfied_by(&self, candidate: &DomainEventRecord) -> bool {
        candidate.event_type == self.0
    }
}
