use serde::Serialize;

/// Trait for domain events.
///
/// Domain events are immutable facts named in past tense. They are plain
/// value snapshots: an event never holds a reference back into storage, so it
/// can be handed to any handler as is.
pub trait DomainEvent: Serialize + Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Returns the event type tag handlers are registered under.
    fn event_type(&self) -> &'static str;
}
