//! Document reference numbering and amendment versioning.
//!
//! Externally visible document numbers (`MT-000042`, `IS-000007/2`) are built
//! from a per-tag sequence plus an amendment counter. The sequence source is
//! an explicit, injected [`SerialVault`] rather than process-wide state.

pub mod reference;
pub mod serial;

pub use reference::{Amend, HasReference, Reference};
pub use serial::SerialVault;
