use core::any::Any;

use serde::{Deserialize, Serialize};

use stagepost_core::{DomainError, DomainResult, Id, StoredRecord};

/// Kind of an inventory location.
///
/// Physical stock sits at `Store` locations; the other kinds are virtual
/// locations representing stock held by (or written off to) an external
/// party, each bound to that party's entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Store,
    Customer,
    Supplier,
    LoanedOut,
    Repair,
    Scrap,
}

impl LocationKind {
    /// Virtual kinds represent stock at an external party and must carry
    /// that party's entity id.
    pub fn is_entity_bound(self) -> bool {
        matches!(
            self,
            LocationKind::Customer
                | LocationKind::Supplier
                | LocationKind::LoanedOut
                | LocationKind::Repair
        )
    }
}

/// A place stock can be at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLocation {
    pub id: Id,
    pub name: String,
    pub kind: LocationKind,
    /// External party the location belongs to, for entity-bound kinds.
    pub entity: Option<Id>,
}

impl InventoryLocation {
    fn new(name: impl Into<String>, kind: LocationKind, entity: Option<Id>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            kind,
            entity,
        }
    }

    /// A physical store/bin.
    pub fn store(name: impl Into<String>) -> Self {
        Self::new(name, LocationKind::Store, None)
    }

    /// Virtual location for stock sold to a customer.
    pub fn customer(name: impl Into<String>, entity: Id) -> Self {
        Self::new(name, LocationKind::Customer, Some(entity))
    }

    /// Virtual location for stock returned to a supplier.
    pub fn supplier(name: impl Into<String>, entity: Id) -> Self {
        Self::new(name, LocationKind::Supplier, Some(entity))
    }

    /// Virtual location for stock loaned out to an external party.
    pub fn loaned_to(name: impl Into<String>, entity: Id) -> Self {
        Self::new(name, LocationKind::LoanedOut, Some(entity))
    }

    /// Virtual location for stock sent out for repair.
    pub fn repair(name: impl Into<String>, entity: Id) -> Self {
        Self::new(name, LocationKind::Repair, Some(entity))
    }

    /// Write-off location.
    pub fn scrap(name: impl Into<String>) -> Self {
        Self::new(name, LocationKind::Scrap, None)
    }
}

impl StoredRecord for InventoryLocation {
    fn id(&self) -> Id {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        if self.kind.is_entity_bound() && self.entity.is_none() {
            return Err(DomainError::validation(format!(
                "{:?} location must be bound to an entity",
                self.kind
            )));
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

    #[test]
    fn entity_bound_kinds_require_an_entity() {
        let mut loc = InventoryLocation::customer("ACME", Id::new());
        assert!(loc.validate().is_ok());
        loc.entity = None;
        assert!(matches!(
            loc.validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(InventoryLocation::store("Main store").validate().is_ok());
    }
}
