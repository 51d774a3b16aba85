//! Durable-store seam.
//!
//! The engine only requires that persisted objects can be fetched by `Id`
//! and that a commit either durably applies all staged changes or none.
//! Query execution, SQL generation and caching live behind this trait.

use stagepost_core::{DomainResult, Id, StoredRecord};
use stagepost_ledger::LedgerEntry;

/// One staged record plus the durable version it was staged against.
///
/// `base_version` is captured when the record first enters a transaction's
/// working set; the store rejects the whole batch if the durable version has
/// moved on since (optimistic concurrency).
#[derive(Debug)]
pub struct StagedWrite {
    pub record: Box<dyn StoredRecord>,
    pub base_version: u64,
}

/// Everything a committing transaction hands to the store as one atomic unit.
#[derive(Debug)]
pub struct CommitBatch {
    pub writes: Vec<StagedWrite>,
    pub postings: Vec<LedgerEntry>,
}

/// Storage collaborator contract.
///
/// `apply` must be atomic: on any error, including a version `Conflict` on a
/// single write, no part of the batch may become durable. Serialization of
/// overlapping commits is the implementation's responsibility.
pub trait ObjectStore: Send + Sync {
    /// Last-committed copy of the object, if any.
    fn load(&self, id: Id) -> Option<Box<dyn StoredRecord>>;

    /// Durable version of the object; 0 when the id is unknown.
    fn version(&self, id: Id) -> u64;

    /// Apply a commit batch atomically.
    fn apply(&self, batch: CommitBatch) -> DomainResult<()>;
}
