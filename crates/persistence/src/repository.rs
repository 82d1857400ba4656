use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::{Entity, Result, Specification};

/// A finite stream of entities produced by one [`Repository::find`] call.
pub type EntityStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Per-entity-type storage gateway.
///
/// Reads return owned values; absence is `Ok(None)`, never an error.
/// Mutations are staged on the owning unit of work and only become durable
/// when it commits.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Finds an entity by its identifier.
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>>;

    /// Returns the first entity satisfying the specification.
    ///
    /// When several entities match, the earliest inserted one wins. Entities
    /// staged by the current unit of work sort after committed ones.
    async fn find_one(&self, spec: &dyn Specification<T>) -> Result<Option<T>>;

    /// Returns every entity satisfying the specification, in insertion order.
    ///
    /// Each call produces a fresh stream.
    async fn find(&self, spec: &dyn Specification<T>) -> Result<EntityStream<T>>;

    /// Stages a new entity.
    async fn add(&self, entity: &T) -> Result<()>;

    /// Stages a replacement for an existing entity.
    async fn update(&self, entity: &T) -> Result<()>;

    /// Stages removal of an entity.
    async fn remove(&self, entity: &T) -> Result<()>;
}

/// Convenience methods for repositories.
#[async_trait]
pub trait RepositoryExt<T: Entity>: Repository<T> {
    /// Collects every matching entity.
    async fn find_all(&self, spec: &dyn Specification<T>) -> Result<Vec<T>> {
        Ok(self.find(spec).await?.collect().await)
    }

    /// Returns true if any entity matches.
    async fn exists(&self, spec: &dyn Specification<T>) -> Result<bool> {
        Ok(self.find_one(spec).await?.is_some())
    }
}

impl<T: Entity, R: Repository<T> + ?Sized> RepositoryExt<T> for R {}
