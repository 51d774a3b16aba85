//! Transactional staging engine.
//!
//! A [`Transaction`] accumulates object mutations and ledger postings in an
//! isolated working set and applies them atomically on commit, or discards
//! them on rollback. Two implementations share one interface:
//! [`DbTransaction`] can durably commit; [`PseudoTransaction`] is a read-only
//! preview whose commit always fails.
//!
//! Scheduling model: a transaction instance has a single logical owner at a
//! time (no internal locking). Across transactions the durable store is the
//! only shared resource; overlapping commits are serialized by the store and
//! the loser fails with `Conflict`.

pub mod manager;
pub mod memory_store;
pub mod posting;
pub mod pseudo;
pub mod store;
pub mod transaction;

pub use manager::TransactionManager;
pub use memory_store::InMemoryObjectStore;
pub use posting::post;
pub use pseudo::PseudoTransaction;
pub use store::{CommitBatch, ObjectStore, StagedWrite};
pub use transaction::{DbTransaction, Transaction, get_as};

#[cfg(test)]
pub(crate) mod testutil {
    use core::any::Any;

    use stagepost_core::{DomainError, DomainResult, Id, StoredRecord};

    /// Minimal record for engine tests: a named counter.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Counter {
        pub id: Id,
        pub name: String,
        pub value: i64,
    }

    impl Counter {
        pub fn new(name: &str, value: i64) -> Self {
            Self {
                id: Id::new(),
                name: name.to_string(),
                value,
            }
        }
    }

    impl StoredRecord for Counter {
        fn id(&self) -> Id {
            self.id
        }

        fn validate(&self) -> DomainResult<()> {
            if self.name.trim().is_empty() {
                return Err(DomainError::validation("counter name cannot be empty"));
            }
            Ok(())
        }

        fn clone_record(&self) -> Box<dyn StoredRecord> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}
