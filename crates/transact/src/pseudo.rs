//! Read-only preview transaction.

use std::collections::HashMap;
use std::sync::Arc;

use stagepost_core::{DomainError, DomainResult, Id, Money, StoredRecord};
use stagepost_ledger::{Account, LedgerEntry, check_balanced};
use stagepost_reference::SerialVault;

use crate::store::ObjectStore;
use crate::transaction::Transaction;

/// A transaction that can never durably commit.
///
/// Supports the same `get`/`is_involved`/`save`/`credit` surface as the real
/// thing so callers can simulate a transaction's effect (compute a document
/// total, check that a posting set balances) without any durable side
/// effect. `credit` only records; [`check_balance`](Self::check_balance)
/// verifies the recorded set. It hands out no serial numbers, so previewed
/// documents stay unnumbered.
pub struct PseudoTransaction {
    store: Arc<dyn ObjectStore>,
    active: bool,
    staged: HashMap<Id, Box<dyn StoredRecord>>,
    recorded: Vec<LedgerEntry>,
    last_serial: u64,
}

impl PseudoTransaction {
    pub(crate) fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            active: true,
            staged: HashMap::new(),
            recorded: Vec::new(),
            last_serial: 0,
        }
    }

    /// Verify the recorded postings satisfy the double-entry invariant,
    /// without applying anything.
    pub fn check_balance(&self) -> DomainResult<()> {
        check_balanced(&self.recorded)
    }
}

impl Transaction for PseudoTransaction {
    fn get(&self, id: Id) -> Option<Box<dyn StoredRecord>> {
        match self.staged.get(&id) {
            Some(record) => Some(record.clone_record()),
            None => self.store.load(id),
        }
    }

    fn is_involved(&self, id: Id) -> bool {
        self.staged.contains_key(&id)
    }

    fn save(&mut self, record: Box<dyn StoredRecord>) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::illegal_state("transaction already closed"));
        }
        self.staged.insert(record.id(), record);
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
        if !self.active {
            return Err(DomainError::posting("credit on a closed transaction"));
        }
        if entry_serial <= self.last_serial {
            return Err(DomainError::posting(format!(
                "entry serial {entry_serial} not after {}",
                self.last_serial
            )));
        }
        self.last_serial = entry_serial;
        self.recorded.push(LedgerEntry {
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
        &self.recorded
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn commit(&mut self) -> DomainResult<()> {
        Err(DomainError::illegal_state(
            "preview transaction cannot commit",
        ))
    }

    fn rollback(&mut self) -> DomainResult<()> {
        self.staged.clear();
        self.recorded.clear();
        self.active = false;
        Ok(())
    }

    fn serial_vault(&self) -> Option<&SerialVault> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryObjectStore;
    use crate::posting::post;
    use crate::testutil::Counter;
    use crate::transaction::get_as;
    use stagepost_core::Currency;
    use stagepost_ledger::AccountKind;

    fn inr() -> Currency {
        Currency::new("INR").unwrap()
    }

    fn preview(store: &Arc<InMemoryObjectStore>) -> PseudoTransaction {
        PseudoTransaction::new(Arc::clone(store) as Arc<dyn ObjectStore>)
    }

    #[test]
    fn commit_always_fails_and_nothing_becomes_durable() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut px = preview(&store);
        let counter = Counter::new("cash", 10);
        px.save(Box::new(counter.clone())).unwrap();

        assert!(matches!(
            px.commit(),
            Err(DomainError::IllegalState(_))
        ));
        // Still usable for further preview reads after the failed commit.
        assert!(px.is_active());
        let seen: Counter = get_as(&px, counter.id).unwrap();
        assert_eq!(seen.value, 10);
        assert!(store.load(counter.id).is_none());
    }

    #[test]
    fn recorded_credits_are_checkable_but_never_applied() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut px = preview(&store);
        let sales = Account::new("4000", "Sales", AccountKind::Revenue);
        let recv = Account::new("1200", "Receivables", AccountKind::Asset);

        post(&mut px, &sales, Money::new(-50, inr()), Money::new(-50, inr()), "sim").unwrap();
        assert!(px.check_balance().is_err());
        post(&mut px, &recv, Money::new(50, inr()), Money::new(50, inr()), "sim").unwrap();
        assert!(px.check_balance().is_ok());
        assert_eq!(px.pending_postings().len(), 2);
        assert!(store.posted_entries().is_empty());
    }

    #[test]
    fn preview_consumes_no_serial_numbers() {
        let store = Arc::new(InMemoryObjectStore::new());
        let px = preview(&store);
        assert!(px.serial_vault().is_none());
    }
}
