//! Storage abstractions for the shop core.
//!
//! - [`Specification`] predicates select entities without exposing query syntax
//! - [`Repository`] is the per-entity gateway (find, add, update, remove)
//! - [`UnitOfWork`] batches staged mutations and commits them atomically
//! - [`InMemoryStore`] is the storage collaborator used by tests and the demo

pub mod entity;
pub mod error;
pub mod memory;
pub mod repository;
pub mod specification;
pub mod unit_of_work;
pub mod version;

pub use entity::{Entity, UniqueKey};
pub use error::{Result, StorageError};
pub use memory::{InMemoryRepository, InMemoryStore, InMemoryUnitOfWork};
pub use repository::{EntityStream, Repository, RepositoryExt};
pub use specification::{All, AndSpec, FnSpec, NotSpec, OrSpec, Specification, spec_fn};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
pub use version::Version;
