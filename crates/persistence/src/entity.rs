use serde::{Serialize, de::DeserializeOwned};

/// A value stored through a [`Repository`](crate::Repository).
///
/// Entities are plain values: repositories hand out owned copies and staged
/// mutations are recorded explicitly, so nothing returned by a read is a live
/// reference into storage.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The identifier type. Its `Display` form is the storage key.
    type Id: std::fmt::Display + Send + Sync;

    /// Returns the entity type name, used as the table name.
    fn entity_type() -> &'static str;

    /// Returns the entity's identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the unique-index entries this entity occupies.
    ///
    /// Storage rejects a commit that would leave two rows of the same type
    /// holding equal entries for the same index.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}

/// An entry in a named unique index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    /// Index name, e.g. `"customer_email"`.
    pub index: &'static str,

    /// Indexed value.
    pub value: String,
}

impl UniqueKey {
    /// Creates a unique-index entry.
    pub fn new(index: &'static str, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}
