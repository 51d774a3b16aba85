//! The persistent-record seam.
//!
//! A [`StoredRecord`] is an opaque persistent entity as seen by the staging
//! engine: it has an identity, can validate itself before commit, and can be
//! copied into a transaction's working set. Entity schemas (columns, indices,
//! field accessors) are the storage collaborator's concern.

use core::any::Any;

use crate::error::DomainResult;
use crate::id::Id;

/// Object-safe interface for persistent entities handled by transactions.
///
/// Records cross thread boundaries through the shared store, so
/// implementations must be `Send + Sync` (plain data types are).
pub trait StoredRecord: Send + Sync + core::fmt::Debug {
    /// Identity of the record.
    fn id(&self) -> Id;

    /// Validation hook invoked on every staged record before commit.
    ///
    /// Returning an error aborts the whole commit; no durable change occurs.
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    /// Copy the record (working-set staging, snapshot reads).
    fn clone_record(&self) -> Box<dyn StoredRecord>;

    /// Downcast support for typed reads through a transaction.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn StoredRecord> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

/// Typed view of a record trait object.
pub fn downcast<T>(record: &dyn StoredRecord) -> Option<T>
where
    T: StoredRecord + Clone + 'static,
{
    record.as_any().downcast_ref::<T>().cloned()
}
