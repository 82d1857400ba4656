use async_trait::async_trait;

use crate::{Entity, Repository, Result};

/// Transactional boundary batching repository mutations.
///
/// A unit of work serves one operation at a time and is not meant to be
/// shared between in-flight operations.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Returns a repository whose mutations are staged on this unit of work.
    fn repository<T: Entity>(&self) -> Box<dyn Repository<T>>;

    /// Persists every staged mutation as one atomic operation.
    ///
    /// On error none of the staged mutations are applied.
    async fn commit(&self) -> Result<()>;

    /// Returns the number of staged, uncommitted mutations.
    async fn pending_changes(&self) -> usize;
}

/// Starts units of work against a storage collaborator.
pub trait UnitOfWorkFactory: Send + Sync {
    /// The unit of work type produced.
    type UnitOfWork: UnitOfWork;

    /// Begins a fresh unit of work.
    fn begin(&self) -> Self::UnitOfWork;
}
