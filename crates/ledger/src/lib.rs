//! Ledger posting types (double-entry).
//!
//! Pure domain logic only: entry values and the balance invariant. Buffering
//! and atomic application of entries is the transaction engine's job.

pub mod account;
pub mod balance;
pub mod entry;

pub use account::{Account, AccountKind};
pub use balance::check_balanced;
pub use entry::LedgerEntry;
