//! Foundation building blocks for the staging engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the persistent-record seam, the error model and money types.

pub mod error;
pub mod id;
pub mod money;
pub mod record;

pub use error::{DomainError, DomainResult};
pub use id::Id;
pub use money::{Currency, Money, Rate};
pub use record::{StoredRecord, downcast};
