//! In-memory object store.

use std::collections::HashMap;
use std::sync::RwLock;

use stagepost_core::{DomainError, DomainResult, Id, StoredRecord};
use stagepost_ledger::LedgerEntry;

use crate::store::{CommitBatch, ObjectStore};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Id, (Box<dyn StoredRecord>, u64)>,
    journal: Vec<LedgerEntry>,
}

/// In-memory durable store.
///
/// Intended for tests/dev. The write lock is the commit serializer: two
/// transactions staging the same object cannot both pass the version check.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    inner: RwLock<Inner>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All ledger entries persisted so far, in commit order.
    pub fn posted_entries(&self) -> Vec<LedgerEntry> {
        match self.inner.read() {
            Ok(inner) => inner.journal.clone(),
            Err(poisoned) => poisoned.into_inner().journal.clone(),
        }
    }

    /// Number of durable records (test observability).
    pub fn record_count(&self) -> usize {
        match self.inner.read() {
            Ok(inner) => inner.records.len(),
            Err(poisoned) => poisoned.into_inner().records.len(),
        }
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn load(&self, id: Id) -> Option<Box<dyn StoredRecord>> {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.records.get(&id).map(|(record, _)| record.clone_record())
    }

    fn version(&self, id: Id) -> u64 {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.records.get(&id).map(|(_, version)| *version).unwrap_or(0)
    }

    fn apply(&self, batch: CommitBatch) -> DomainResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("store lock poisoned"))?;

        // Version-check every write before touching anything: the batch is
        // all-or-nothing.
        for write in &batch.writes {
            let id = write.record.id();
            let current = inner.records.get(&id).map(|(_, v)| *v).unwrap_or(0);
            if current != write.base_version {
                tracing::warn!(%id, current, staged_against = write.base_version,
                    "commit conflict on staged object");
                return Err(DomainError::conflict(format!(
                    "object {id} changed since staging (version {current}, staged against {})",
                    write.base_version
                )));
            }
        }

        for write in batch.writes {
            let id = write.record.id();
            let next_version = write.base_version + 1;
            inner.records.insert(id, (write.record, next_version));
        }
        inner.journal.extend(batch.postings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StagedWrite;
    use crate::testutil::Counter;
    use stagepost_core::downcast;
    use std::sync::Arc;
    use std::thread;

    fn write_of(counter: &Counter, base_version: u64) -> StagedWrite {
        StagedWrite {
            record: Box::new(counter.clone()),
            base_version,
        }
    }

    #[test]
    fn apply_persists_records_and_bumps_versions() {
        let store = InMemoryObjectStore::new();
        let counter = Counter::new("cash", 10);

        store
            .apply(CommitBatch {
                writes: vec![write_of(&counter, 0)],
                postings: vec![],
            })
            .unwrap();

        assert_eq!(store.version(counter.id), 1);
        let loaded: Counter = downcast(store.load(counter.id).unwrap().as_ref()).unwrap();
        assert_eq!(loaded, counter);
    }

    #[test]
    fn stale_version_fails_whole_batch() {
        let store = InMemoryObjectStore::new();
        let a = Counter::new("a", 1);
        let b = Counter::new("b", 2);

        store
            .apply(CommitBatch {
                writes: vec![write_of(&a, 0)],
                postings: vec![],
            })
            .unwrap();

        // `a` is now at version 1; staging against 0 is stale. `b` must not
        // slip through either.
        let err = store
            .apply(CommitBatch {
                writes: vec![write_of(&b, 0), write_of(&a, 0)],
                postings: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(store.load(b.id).is_none());
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn store_is_shared_across_threads() {
        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..2i64)
            .map(|value| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let counter = Counter::new("cash", value);
                    store
                        .apply(CommitBatch {
                            writes: vec![write_of(&counter, 0)],
                            postings: vec![],
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn unknown_id_has_version_zero() {
        let store = InMemoryObjectStore::new();
        assert_eq!(store.version(Id::new()), 0);
        assert!(store.load(Id::new()).is_none());
    }
}
