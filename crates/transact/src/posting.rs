//! Posting helper: credit with a generated entry serial.

use stagepost_core::{DomainResult, Money};
use stagepost_ledger::Account;

use crate::transaction::Transaction;

/// Buffer a ledger posting with the transaction's next entry serial.
///
/// Serials are strictly increasing within one transaction, which makes the
/// posting order deterministic for replay and audit. Returns the serial used.
/// The `local_amount` conversion is the caller's responsibility (rate lookup
/// is an external collaborator); the balance of the aggregate set is checked
/// at commit, not here.
pub fn post(
    tx: &mut (impl Transaction + ?Sized),
    account: &Account,
    amount: Money,
    local_amount: Money,
    narration: &str,
) -> DomainResult<u64> {
    let serial = tx.next_entry_serial();
    tx.credit(serial, account, amount, local_amount, narration)?;
    Ok(serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TransactionManager;
    use crate::memory_store::InMemoryObjectStore;
    use std::sync::Arc;

    use stagepost_core::{Currency, Id};
    use stagepost_ledger::AccountKind;

    #[test]
    fn serials_increase_across_posts() {
        let store = Arc::new(InMemoryObjectStore::new());
        let inr = Currency::new("INR").unwrap();
        let manager = TransactionManager::new(Id::new(), inr, store);
        let mut tx = manager.transaction();

        let sales = Account::new("4000", "Sales", AccountKind::Revenue);
        let recv = Account::new("1200", "Receivables", AccountKind::Asset);

        let s1 = post(&mut tx, &sales, Money::new(-10, inr), Money::new(-10, inr), "a").unwrap();
        let s2 = post(&mut tx, &recv, Money::new(10, inr), Money::new(10, inr), "b").unwrap();
        assert_eq!((s1, s2), (1, 2));
        assert!(tx.commit().is_ok());
    }
}
