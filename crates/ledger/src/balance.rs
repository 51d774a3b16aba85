//! Double-entry balance invariant.

use stagepost_core::{DomainError, DomainResult};

use crate::entry::LedgerEntry;

/// Verify that a set of pending entries nets to zero in the reporting
/// currency.
///
/// Checked at commit time only: a transaction commonly interleaves several
/// balanced sub-postings before the aggregate nets out, so eager per-post
/// checking would reject valid multi-line documents.
///
/// All `local_amount`s must share one currency. With integral minor units the
/// smallest-currency-unit tolerance is an exact zero.
pub fn check_balanced(entries: &[LedgerEntry]) -> DomainResult<()> {
    let Some(first) = entries.first() else {
        return Ok(());
    };
    let reporting = first.local_amount.currency;
    let mut net: i128 = 0;
    for entry in entries {
        if entry.local_amount.currency != reporting {
            return Err(DomainError::posting(format!(
                "entry {} posted in {}, reporting currency is {}",
                entry.entry_serial, entry.local_amount.currency, reporting
            )));
        }
        net += i128::from(entry.local_amount.minor);
    }
    if net != 0 {
        return Err(DomainError::posting(format!(
            "postings do not balance: net {net} {reporting}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use proptest::prelude::*;
    use stagepost_core::{Currency, Money};

    fn inr() -> Currency {
        Currency::new("INR").unwrap()
    }

    fn entry(serial: u64, local_minor: i64) -> LedgerEntry {
        LedgerEntry {
            entry_serial: serial,
            account: Account::new("4000", "Sales", AccountKind::Revenue),
            amount: Money::new(local_minor, inr()),
            local_amount: Money::new(local_minor, inr()),
            narration: String::new(),
        }
    }

    #[test]
    fn empty_set_is_balanced() {
        assert!(check_balanced(&[]).is_ok());
    }

    #[test]
    fn balanced_pair_passes() {
        assert!(check_balanced(&[entry(1, 500), entry(2, -500)]).is_ok());
    }

    #[test]
    fn unbalanced_set_is_rejected() {
        let err = check_balanced(&[entry(1, 500), entry(2, -400)]).unwrap_err();
        assert!(matches!(err, DomainError::Posting(_)));
    }

    #[test]
    fn mixed_reporting_currency_is_rejected() {
        let mut odd = entry(2, -500);
        odd.local_amount = Money::new(-500, Currency::new("USD").unwrap());
        let err = check_balanced(&[entry(1, 500), odd]).unwrap_err();
        assert!(matches!(err, DomainError::Posting(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any set built from balanced pairs nets to zero and
        /// passes the check; perturbing one entry breaks it.
        #[test]
        fn balanced_pairs_always_pass(
            amounts in prop::collection::vec(1i64..1_000_000i64, 1..10)
        ) {
            let mut entries = Vec::new();
            let mut serial = 0u64;
            for amount in &amounts {
                serial += 1;
                entries.push(entry(serial, *amount));
                serial += 1;
                entries.push(entry(serial, -*amount));
            }
            prop_assert!(check_balanced(&entries).is_ok());

            entries[0].local_amount.minor += 1;
            prop_assert!(check_balanced(&entries).is_err());
        }
    }
}
