//! The transaction contract and its durable implementation.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use stagepost_core::{DomainError, DomainResult, Id, Money, StoredRecord, downcast};
use stagepost_ledger::{Account, LedgerEntry, check_balanced};
use stagepost_reference::SerialVault;

use crate::store::{CommitBatch, ObjectStore, StagedWrite};

/// One unit of work: staged object mutations plus buffered ledger postings.
///
/// One interface, two implementations: [`DbTransaction`](crate::DbTransaction)
/// can durably commit, [`PseudoTransaction`](crate::PseudoTransaction) never
/// can. The distinction is part of the type, not a runtime flag.
pub trait Transaction {
    /// The staged copy if the id is involved in this transaction, otherwise
    /// the last-committed durable copy. Never another active transaction's
    /// staged state.
    fn get(&self, id: Id) -> Option<Box<dyn StoredRecord>>;

    /// True iff the id has a staged copy in this transaction.
    fn is_involved(&self, id: Id) -> bool;

    /// Stage a mutated copy of a persistent object.
    fn save(&mut self, record: Box<dyn StoredRecord>) -> DomainResult<()>;

    /// Buffer a ledger posting. Durable storage is untouched until commit.
    ///
    /// `entry_serial` must be strictly greater than any serial already
    /// buffered; use [`post`](crate::post) to have one generated. Fails with
    /// a posting error on a closed transaction.
    fn credit(
        &mut self,
        entry_serial: u64,
        account: &Account,
        amount: Money,
        local_amount: Money,
        narration: &str,
    ) -> DomainResult<()>;

    /// Next free entry serial (strictly increasing, starts at 1).
    fn next_entry_serial(&mut self) -> u64;

    /// Postings buffered so far, in serial order.
    fn pending_postings(&self) -> &[LedgerEntry];

    /// True from creation until commit or rollback.
    fn is_active(&self) -> bool;

    /// Atomically validate, balance-check and persist the working set.
    fn commit(&mut self) -> DomainResult<()>;

    /// Discard the working set.
    ///
    /// Safe from failure-handling paths: after a rollback it is a no-op.
    /// After a successful commit it is rejected with `IllegalState`.
    fn rollback(&mut self) -> DomainResult<()>;

    /// Sequence source for document numbering; `None` for transactions that
    /// can never durably commit (they must not consume numbers).
    fn serial_vault(&self) -> Option<&SerialVault>;
}

/// Typed read through a transaction.
pub fn get_as<T>(tx: &(impl Transaction + ?Sized), id: Id) -> Option<T>
where
    T: StoredRecord + Clone + 'static,
{
    tx.get(id).and_then(|record| downcast::<T>(record.as_ref()))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

/// The real unit of work, bound to a durable store.
///
/// Created by [`TransactionManager`](crate::TransactionManager). Single-owner:
/// concurrent use of one instance is the caller's bug to prevent.
pub struct DbTransaction {
    owner: Id,
    state: TxState,
    store: Arc<dyn ObjectStore>,
    serials: Arc<SerialVault>,
    /// Staged writes in first-staging order; the map indexes into the vec.
    staged: Vec<StagedWrite>,
    involved: HashMap<Id, usize>,
    postings: Vec<LedgerEntry>,
    last_serial: u64,
}

impl DbTransaction {
    pub(crate) fn new(owner: Id, store: Arc<dyn ObjectStore>, serials: Arc<SerialVault>) -> Self {
        tracing::debug!(%owner, "transaction opened");
        Self {
            owner,
            state: TxState::Active,
            store,
            serials,
            staged: Vec::new(),
            involved: HashMap::new(),
            postings: Vec::new(),
            last_serial: 0,
        }
    }

    /// Requester identity the transaction is bound to.
    pub fn owner(&self) -> Id {
        self.owner
    }

    fn ensure_active(&self) -> DomainResult<()> {
        match self.state {
            TxState::Active => Ok(()),
            _ => Err(DomainError::illegal_state("transaction already closed")),
        }
    }
}

impl Transaction for DbTransaction {
    fn get(&self, id: Id) -> Option<Box<dyn StoredRecord>> {
        match self.involved.get(&id) {
            Some(&slot) => Some(self.staged[slot].record.clone_record()),
            None => self.store.load(id),
        }
    }

    fn is_involved(&self, id: Id) -> bool {
        self.involved.contains_key(&id)
    }

    fn save(&mut self, record: Box<dyn StoredRecord>) -> DomainResult<()> {
        self.ensure_active()?;
        let id = record.id();
        match self.involved.get(&id) {
            Some(&slot) => {
                // Re-staging keeps the version captured at first involvement.
                self.staged[slot].record = record;
            }
            None => {
                let base_version = self.store.version(id);
                self.involved.insert(id, self.staged.len());
                self.staged.push(StagedWrite {
                    record,
                    base_version,
                });
            }
        }
        Ok(())
    }

    fn credit(
        &mut self,
        entry_serial: u64,
        account: &Account,
        amount: Money,
        local_amount: Money,
        narration: &str,
    ) -> DomainResult<()> {
        if self.state != TxState::Active {
            return Err(DomainError::posting("credit on a closed transaction"));
        }
        if entry_serial <= self.last_serial {
            return Err(DomainError::posting(format!(
                "entry serial {entry_serial} not after {}",
                self.last_serial
            )));
        }
        self.last_serial = entry_serial;
        self.postings.push(LedgerEntry {
            entry_serial,
            account: account.clone(),
            amount,
            local_amount,
            narration: narration.to_string(),
        });
        Ok(())
    }

    fn next_entry_serial(&mut self) -> u64 {
        self.last_serial + 1
    }

    fn pending_postings(&self) -> &[LedgerEntry] {
        &self.postings
    }

    fn is_active(&self) -> bool {
        self.state == TxState::Active
    }

    fn commit(&mut self) -> DomainResult<()> {
        self.ensure_active()?;

        // Close first and take the working set out: every failure path below
        // must leave the transaction inactive with its staged state discarded,
        // equivalent to a rollback, with the store untouched.
        self.state = TxState::RolledBack;
        let staged = mem::take(&mut self.staged);
        self.involved.clear();
        let postings = mem::take(&mut self.postings);

        for write in &staged {
            write.record.validate()?;
        }
        check_balanced(&postings)?;

        let records = staged.len();
        let entries = postings.len();
        self.store.apply(CommitBatch {
            writes: staged,
            postings,
        })?;
        self.state = TxState::Committed;
        tracing::debug!(owner = %self.owner, records, entries, "transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> DomainResult<()> {
        match self.state {
            TxState::Active => {
                self.staged.clear();
                self.involved.clear();
                self.postings.clear();
                self.state = TxState::RolledBack;
                tracing::debug!(owner = %self.owner, "transaction rolled back");
                Ok(())
            }
            TxState::RolledBack => Ok(()),
            TxState::Committed => Err(DomainError::illegal_state(
                "transaction already committed",
            )),
        }
    }

    fn serial_vault(&self) -> Option<&SerialVault> {
        Some(&self.serials)
    }
}
