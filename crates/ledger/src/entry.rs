use serde::{Deserialize, Serialize};

use stagepost_core::Money;

use crate::account::Account;

/// One pending ledger posting inside a transaction.
///
/// `entry_serial` is strictly increasing within the owning transaction and
/// orders entries for deterministic replay and audit. `amount` is denominated
/// in the transaction currency; `local_amount` is the caller-converted value
/// in the reporting currency, which is what the balance invariant is checked
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_serial: u64,
    pub account: Account,
    pub amount: Money,
    pub local_amount: Money,
    pub narration: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;
    use stagepost_core::Currency;

    #[test]
    fn serialized_shape_is_stable() {
        let entry = LedgerEntry {
            entry_serial: 7,
            account: Account::new("4000", "Sales", AccountKind::Revenue),
            amount: Money::new(-500, Currency::new("USD").unwrap()),
            local_amount: Money::new(-625, Currency::new("INR").unwrap()),
            narration: "Sale of goods".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["entry_serial"], 7);
        assert_eq!(json["account"]["kind"], "revenue");
        assert_eq!(json["local_amount"]["currency"], "INR");
    }
}
