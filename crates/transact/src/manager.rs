//! Transaction manager: the factory side of the engine.

use std::sync::Arc;

use stagepost_core::{Currency, DomainResult, Id};
use stagepost_reference::SerialVault;

use crate::pseudo::PseudoTransaction;
use crate::store::ObjectStore;
use crate::transaction::{DbTransaction, Transaction};

/// Creates transactions bound to a requester identity and a local
/// (reporting) currency.
///
/// Owns the durable store handle and the document serial vault, so nothing
/// in the engine depends on process-wide state.
pub struct TransactionManager {
    user: Id,
    currency: Currency,
    store: Arc<dyn ObjectStore>,
    serials: Arc<SerialVault>,
}

impl TransactionManager {
    pub fn new(user: Id, currency: Currency, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            user,
            currency,
            store,
            serials: Arc::new(SerialVault::new()),
        }
    }

    /// Share an existing serial vault (several managers, one numbering
    /// space).
    pub fn with_serials(mut self, serials: Arc<SerialVault>) -> Self {
        self.serials = serials;
        self
    }

    pub fn user(&self) -> Id {
        self.user
    }

    /// Local currency postings are balanced against.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn serials(&self) -> &Arc<SerialVault> {
        &self.serials
    }

    /// Open a new unit of work.
    pub fn transaction(&self) -> DbTransaction {
        DbTransaction::new(self.user, Arc::clone(&self.store), Arc::clone(&self.serials))
    }

    /// Open a read-only preview.
    pub fn preview(&self) -> PseudoTransaction {
        PseudoTransaction::new(Arc::clone(&self.store))
    }

    /// Run a closure inside a fresh transaction: commit on `Ok`, roll back
    /// on `Err` and propagate the error.
    pub fn transact<F>(&self, f: F) -> DomainResult<()>
    where
        F: FnOnce(&mut DbTransaction) -> DomainResult<()>,
    {
        let mut tx = self.transaction();
        match f(&mut tx) {
            Ok(()) => tx.commit(),
            Err(e) => {
                // Rollback of a still-active transaction cannot fail.
                let _ = tx.rollback();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryObjectStore;
    use crate::testutil::Counter;
    use crate::transaction::get_as;
    use stagepost_core::DomainError;

    fn manager(store: &Arc<InMemoryObjectStore>) -> TransactionManager {
        TransactionManager::new(
            Id::new(),
            Currency::new("INR").unwrap(),
            Arc::clone(store) as Arc<dyn ObjectStore>,
        )
    }

    #[test]
    fn transact_commits_on_ok() {
        let store = Arc::new(InMemoryObjectStore::new());
        let manager = manager(&store);
        let counter = Counter::new("cash", 3);
        let id = counter.id;

        manager
            .transact(|tx| tx.save(Box::new(counter.clone())))
            .unwrap();

        let tx = manager.transaction();
        let seen: Counter = get_as(&tx, id).unwrap();
        assert_eq!(seen.value, 3);
    }

    #[test]
    fn transact_rolls_back_on_err() {
        let store = Arc::new(InMemoryObjectStore::new());
        let manager = manager(&store);
        let counter = Counter::new("cash", 3);
        let id = counter.id;

        let err = manager
            .transact(|tx| {
                tx.save(Box::new(counter.clone()))?;
                Err(DomainError::validation("caller bailed"))
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store.load(id).is_none());
    }

    #[test]
    fn managers_can_share_a_numbering_space() {
        let store = Arc::new(InMemoryObjectStore::new());
        let vault = Arc::new(SerialVault::new());
        let m1 = manager(&store).with_serials(Arc::clone(&vault));
        let m2 = manager(&store).with_serials(Arc::clone(&vault));

        let tx1 = m1.transaction();
        let tx2 = m2.transaction();
        let a = tx1.serial_vault().unwrap().next("MT-");
        let b = tx2.serial_vault().unwrap().next("MT-");
        assert_eq!((a, b), (1, 2));
    }
}
