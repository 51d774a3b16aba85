use core::any::Any;

use serde::{Deserialize, Serialize};

use stagepost_core::{DomainError, DomainResult, Id, Money, StoredRecord};

/// A stocked item: a quantity of one part at one location.
///
/// A movement line changes exactly one item's location and/or quantity.
/// Moving part of an item's quantity splits off a new item record at the
/// destination (the engine reports the split in its `items_changed` map).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Id,
    pub part_number: String,
    /// Whole units on hand at `location`.
    pub quantity: u64,
    /// Cost per unit, in the transaction currency.
    pub unit_cost: Money,
    pub location: Id,
    /// Set while the item is between locations (sent, not yet received).
    pub in_transit: bool,
}

impl InventoryItem {
    pub fn new(part_number: impl Into<String>, quantity: u64, unit_cost: Money, location: Id) -> Self {
        Self {
            id: Id::new(),
            part_number: part_number.into(),
            quantity,
            unit_cost,
            location,
            in_transit: false,
        }
    }
}

impl StoredRecord for InventoryItem {
    fn id(&self) -> Id {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        if self.part_number.trim().is_empty() {
            return Err(DomainError::validation("item part number cannot be empty"));
        }
        if self.unit_cost.minor < 0 {
            return Err(DomainError::validation("item unit cost cannot be negative"));
        }
        Ok(())
    }

    fn clone_record(&self) -> Box<dyn StoredRecord> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagepost_core::Currency;

    #[test]
    fn validation_rejects_blank_part_number() {
        let money = Money::new(100, Currency::new("INR").unwrap());
        let item = InventoryItem::new("  ", 1, money, Id::new());
        assert!(matches!(
            item.validate(),
            Err(DomainError::Validation(_))
        ));
    }
}
