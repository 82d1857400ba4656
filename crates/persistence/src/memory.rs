use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::{
    Entity, EntityStream, Repository, Result, Specification, StorageError, UniqueKey, UnitOfWork,
    UnitOfWorkFactory, Version,
};

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    version: Version,
    data: Value,
    unique_keys: Vec<UniqueKey>,
}

type Table = HashMap<String, Row>;

#[derive(Debug, Clone, Default)]
struct Tables {
    tables: HashMap<&'static str, Table>,
    next_seq: u64,
}

impl Tables {
    fn row(&self, entity_type: &str, key: &str) -> Option<&Row> {
        self.tables.get(entity_type).and_then(|t| t.get(key))
    }

    /// Committed rows of a table in insertion order.
    fn rows_in_order(&self, entity_type: &str) -> Vec<(&String, &Row)> {
        let mut rows: Vec<_> = self
            .tables
            .get(entity_type)
            .map(|t| t.iter().collect())
            .unwrap_or_default();
        rows.sort_by_key(|(_, row)| row.seq);
        rows
    }

    fn apply(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::Insert {
                entity_type,
                key,
                data,
                unique_keys,
            } => {
                let entity_type = *entity_type;
                let table = self.tables.entry(entity_type).or_default();
                if table.contains_key(key) {
                    return Err(StorageError::DuplicateKey {
                        entity_type,
                        id: key.clone(),
                    });
                }
                check_unique(table, entity_type, key, unique_keys)?;
                self.next_seq += 1;
                table.insert(
                    key.clone(),
                    Row {
                        seq: self.next_seq,
                        version: Version::first(),
                        data: data.clone(),
                        unique_keys: unique_keys.clone(),
                    },
                );
            }
            Change::Update {
                entity_type,
                key,
                data,
                unique_keys,
                expected,
            } => {
                let entity_type = *entity_type;
                let table = self.tables.entry(entity_type).or_default();
                let current = current_version(table, entity_type, key, *expected)?;
                check_unique(table, entity_type, key, unique_keys)?;
                if let Some(row) = table.get_mut(key) {
                    row.version = current.next();
                    row.data = data.clone();
                    row.unique_keys = unique_keys.clone();
                }
            }
            Change::Delete {
                entity_type,
                key,
                expected,
            } => {
                let entity_type = *entity_type;
                let table = self.tables.entry(entity_type).or_default();
                current_version(table, entity_type, key, *expected)?;
                table.remove(key);
            }
        }
        Ok(())
    }
}

/// Returns the row's version after checking it against the version observed
/// when the unit of work read it.
fn current_version(
    table: &Table,
    entity_type: &'static str,
    key: &str,
    expected: Option<Version>,
) -> Result<Version> {
    let row = table.get(key).ok_or_else(|| StorageError::Missing {
        entity_type,
        id: key.to_string(),
    })?;
    if let Some(expected) = expected
        && row.version != expected
    {
        return Err(StorageError::ConcurrencyConflict {
            entity_type,
            id: key.to_string(),
            expected,
            actual: row.version,
        });
    }
    Ok(row.version)
}

fn check_unique(
    table: &Table,
    entity_type: &'static str,
    key: &str,
    unique_keys: &[UniqueKey],
) -> Result<()> {
    for unique in unique_keys {
        let taken = table
            .iter()
            .any(|(other_key, row)| other_key != key && row.unique_keys.contains(unique));
        if taken {
            return Err(StorageError::ConstraintViolation {
                entity_type,
                index: unique.index,
                value: unique.value.clone(),
            });
        }
    }
    Ok(())
}

/// A staged mutation.
#[derive(Debug, Clone)]
enum Change {
    Insert {
        entity_type: &'static str,
        key: String,
        data: Value,
        unique_keys: Vec<UniqueKey>,
    },
    Update {
        entity_type: &'static str,
        key: String,
        data: Value,
        unique_keys: Vec<UniqueKey>,
        expected: Option<Version>,
    },
    Delete {
        entity_type: &'static str,
        key: String,
        expected: Option<Version>,
    },
}

impl Change {
    fn targets(&self, target_type: &str, target_key: &str) -> bool {
        let (entity_type, key) = match self {
            Change::Insert {
                entity_type, key, ..
            }
            | Change::Update {
                entity_type, key, ..
            }
            | Change::Delete {
                entity_type, key, ..
            } => (*entity_type, key.as_str()),
        };
        entity_type == target_type && key == target_key
    }
}

#[derive(Debug, Default)]
struct ChangeSet {
    changes: Vec<Change>,
    /// Versions of committed rows as first read through this unit of work.
    observed: HashMap<(&'static str, String), Version>,
}

impl ChangeSet {
    /// The staged state of a row: `Some(Some(data))` if staged as present,
    /// `Some(None)` if staged for removal, `None` if untouched.
    fn latest(&self, entity_type: &str, key: &str) -> Option<Option<Value>> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.targets(entity_type, key))
            .map(|c| match c {
                Change::Insert { data, .. } | Change::Update { data, .. } => Some(data.clone()),
                Change::Delete { .. } => None,
            })
    }

    fn observe(&mut self, entity_type: &'static str, key: &str, version: Version) {
        self.observed
            .entry((entity_type, key.to_string()))
            .or_insert(version);
    }

    fn expected(&self, entity_type: &'static str, key: &str) -> Option<Version> {
        self.observed
            .get(&(entity_type, key.to_string()))
            .copied()
    }
}

/// In-memory storage collaborator.
///
/// Rows are kept as JSON per entity type, each with an insertion sequence and
/// a version. Commits are applied to a copy of the tables and swapped in only
/// when every staged change validates, so a failed commit leaves no trace.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<Tables>>,
    injected_failure: Arc<Mutex<Option<String>>>,
    commit_attempts: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commit against this store fail with
    /// [`StorageError::Unavailable`].
    pub async fn fail_next_commit(&self, reason: impl Into<String>) {
        *self.injected_failure.lock().await = Some(reason.into());
    }

    /// Returns how many times a unit of work of this store called commit.
    pub fn commit_attempts(&self) -> u64 {
        self.commit_attempts.load(Ordering::SeqCst)
    }

    /// Returns the number of committed rows of an entity type.
    pub async fn row_count(&self, entity_type: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(entity_type)
            .map_or(0, HashMap::len)
    }
}

impl UnitOfWorkFactory for InMemoryStore {
    type UnitOfWork = InMemoryUnitOfWork;

    fn begin(&self) -> InMemoryUnitOfWork {
        InMemoryUnitOfWork {
            store: self.clone(),
            changes: Arc::new(Mutex::new(ChangeSet::default())),
        }
    }
}

/// Unit of work over an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
    changes: Arc<Mutex<ChangeSet>>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn repository<T: Entity>(&self) -> Box<dyn Repository<T>> {
        Box::new(InMemoryRepository::<T> {
            store: self.store.clone(),
            changes: self.changes.clone(),
            _phantom: PhantomData,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn commit(&self) -> Result<()> {
        self.store.commit_attempts.fetch_add(1, Ordering::SeqCst);

        let mut changes = self.changes.lock().await;

        if let Some(reason) = self.store.injected_failure.lock().await.take() {
            metrics::counter!("unit_of_work_commit_failures_total").increment(1);
            tracing::warn!(%reason, staged = changes.changes.len(), "commit rejected by storage");
            return Err(StorageError::Unavailable(reason));
        }

        let mut tables = self.store.state.write().await;
        let mut working = tables.clone();
        for change in &changes.changes {
            if let Err(e) = working.apply(change) {
                metrics::counter!("unit_of_work_commit_failures_total").increment(1);
                tracing::warn!(error = %e, "commit rejected");
                return Err(e);
            }
        }
        *tables = working;

        let applied = changes.changes.len();
        changes.changes.clear();
        changes.observed.clear();

        metrics::counter!("unit_of_work_commits_total").increment(1);
        tracing::debug!(applied, "unit of work committed");
        Ok(())
    }

    async fn pending_changes(&self) -> usize {
        self.changes.lock().await.changes.len()
    }
}

/// Repository staging its mutations on an [`InMemoryUnitOfWork`].
pub struct InMemoryRepository<T> {
    store: InMemoryStore,
    changes: Arc<Mutex<ChangeSet>>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> InMemoryRepository<T> {
    /// Current rows as seen by this unit of work, in insertion order.
    async fn visible_rows(&self) -> Vec<Value> {
        let entity_type = T::entity_type();
        let mut changes = self.changes.lock().await;
        let tables = self.store.state.read().await;

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for (key, row) in tables.rows_in_order(entity_type) {
            seen.insert(key.clone());
            match changes.latest(entity_type, key) {
                Some(Some(data)) => rows.push(data),
                Some(None) => {}
                None => {
                    changes.observe(entity_type, key, row.version);
                    rows.push(row.data.clone());
                }
            }
        }

        let staged: Vec<String> = changes
            .changes
            .iter()
            .filter_map(|c| match c {
                Change::Insert {
                    entity_type: et,
                    key,
                    ..
                } if *et == entity_type => Some(key.clone()),
                _ => None,
            })
            .collect();
        for key in staged {
            if seen.insert(key.clone())
                && let Some(Some(data)) = changes.latest(entity_type, &key)
            {
                rows.push(data);
            }
        }

        rows
    }

    async fn matching(&self, spec: &dyn Specification<T>) -> Result<Vec<T>> {
        let mut matches = Vec::new();
        for data in self.visible_rows().await {
            let entity: T = serde_json::from_value(data)?;
            if spec.is_satisfied_by(&entity) {
                matches.push(entity);
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>> {
        let entity_type = T::entity_type();
        let key = id.to_string();
        let mut changes = self.changes.lock().await;

        if let Some(staged) = changes.latest(entity_type, &key) {
            return match staged {
                Some(data) => Ok(Some(serde_json::from_value(data)?)),
                None => Ok(None),
            };
        }

        let tables = self.store.state.read().await;
        match tables.row(entity_type, &key) {
            Some(row) => {
                changes.observe(entity_type, &key, row.version);
                Ok(Some(serde_json::from_value(row.data.clone())?))
            }
            None => Ok(None),
        }
    }

    async fn find_one(&self, spec: &dyn Specification<T>) -> Result<Option<T>> {
        for data in self.visible_rows().await {
            let entity: T = serde_json::from_value(data)?;
            if spec.is_satisfied_by(&entity) {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    async fn find(&self, spec: &dyn Specification<T>) -> Result<EntityStream<T>> {
        let matches = self.matching(spec).await?;
        Ok(Box::pin(futures_util::stream::iter(matches)))
    }

    async fn add(&self, entity: &T) -> Result<()> {
        let change = Change::Insert {
            entity_type: T::entity_type(),
            key: entity.id().to_string(),
            data: serde_json::to_value(entity)?,
            unique_keys: entity.unique_keys(),
        };
        self.changes.lock().await.changes.push(change);
        Ok(())
    }

    async fn update(&self, entity: &T) -> Result<()> {
        let entity_type = T::entity_type();
        let key = entity.id().to_string();
        let new_data = serde_json::to_value(entity)?;
        let new_keys = entity.unique_keys();

        let mut changes = self.changes.lock().await;
        let expected = changes.expected(entity_type, &key);

        // A row already staged as present is rewritten in place so the
        // version check runs once against the originally observed version.
        if let Some(
            Change::Insert {
                data, unique_keys, ..
            }
            | Change::Update {
                data, unique_keys, ..
            },
        ) = changes
            .changes
            .iter_mut()
            .rev()
            .find(|c| c.targets(entity_type, &key))
        {
            *data = new_data;
            *unique_keys = new_keys;
            return Ok(());
        }

        changes.changes.push(Change::Update {
            entity_type,
            key,
            data: new_data,
            unique_keys: new_keys,
            expected,
        });
        Ok(())
    }

    async fn remove(&self, entity: &T) -> Result<()> {
        let entity_type = T::entity_type();
        let key = entity.id().to_string();
        let mut changes = self.changes.lock().await;

        let staged_insert = matches!(
            changes
                .changes
                .iter()
                .rev()
                .find(|c| c.targets(entity_type, &key)),
            Some(Change::Insert { .. })
        );
        if staged_insert {
            changes.changes.retain(|c| !c.targets(entity_type, &key));
            return Ok(());
        }

        let expected = changes.expected(entity_type, &key);
        changes.changes.push(Change::Delete {
            entity_type,
            key,
            expected,
        });
        Ok(())
    }
}
