//! Inventory movement engine.
//!
//! Moves quantities of inventory items between locations through the staging
//! engine: quantity changes are staged object mutations, value-bearing
//! movements buffer ledger postings, and all of it becomes durable (or none
//! of it does) at the owning transaction's commit.

pub mod item;
pub mod location;
pub mod movement;

pub use item::InventoryItem;
pub use location::{InventoryLocation, LocationKind};
pub use movement::{
    InventoryMovement, MovementDocument, MovementKind, MovementLine, MovementStatus, ValueAccounts,
};
