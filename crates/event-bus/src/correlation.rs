//! Correlation identifier providers.

use std::future::Future;

use common::CorrelationId;

tokio::task_local! {
    static CURRENT: CorrelationId;
}

/// Supplies the correlation id of the request currently being served.
pub trait CorrelationIdProvider: Send + Sync {
    /// Returns the current correlation id.
    fn correlation_id(&self) -> CorrelationId;
}

/// Runs a future as one logical request identified by `id`.
pub async fn scope<F: Future>(id: CorrelationId, future: F) -> F::Output {
    CURRENT.scope(id, future).await
}

/// Returns the correlation id of the enclosing [`scope`], if any.
pub fn current() -> Option<CorrelationId> {
    CURRENT.try_with(|id| *id).ok()
}

/// Reads the id set by [`scope`] on the current task.
///
/// Outside a scope it returns the nil id.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCorrelation;

impl CorrelationIdProvider for TaskCorrelation {
    fn correlation_id(&self) -> CorrelationId {
        current().unwrap_or_else(CorrelationId::nil)
    }
}

/// Always returns the same id.
#[derive(Debug, Clone, Copy)]
pub struct FixedCorrelation(pub CorrelationId);

impl CorrelationIdProvider for FixedCorrelation {
    fn correlation_id(&self) -> CorrelationId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn task_correlation_reads_enclosing_scope() {
        let id = CorrelationId::new();
        let seen = scope(id, async { TaskCorrelation.correlation_id() }).await;
        assert_eq!(seen, id);
    }

    #[tokio::test]
    async fn task_correlation_is_nil_outside_scope() {
        assert!(TaskCorrelation.correlation_id().is_nil());
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn nested_scopes_shadow_outer_id() {
        let outer = CorrelationId::new();
        let inner = CorrelationId::new();
        scope(outer, async {
            scope(inner, async { assert_eq!(current(), Some(inner)) }).await;
            assert_eq!(current(), Some(outer));
        })
        .await;
    }
}
