//! Movement documents and the shared movement routine.
//!
//! Transfer, Sale, Loan-out and Return are variants of one movement
//! lifecycle. Each variant is a small descriptor (destination kind,
//! value-posting flag, tag prefix, narration verb) dispatched from a single
//! `move_item` routine; there are no per-variant overrides to diverge.

use core::any::Any;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stagepost_core::{DomainError, DomainResult, Id, StoredRecord};
use stagepost_ledger::Account;
use stagepost_reference::HasReference;
use stagepost_transact::{Transaction, get_as, post};

use crate::item::InventoryItem;
use crate::location::{InventoryLocation, LocationKind};

/// Movement document variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock moved between own stores.
    Transfer,
    /// Stock sold to a customer.
    Sale,
    /// Stock loaned out to an external party.
    LoanOut,
    /// Stock returned to a supplier.
    Return,
}

/// Variant descriptor: the data that distinguishes movement kinds.
#[derive(Debug, Copy, Clone)]
pub(crate) struct VariantSpec {
    pub tag_prefix: &'static str,
    pub dest_kind: LocationKind,
    pub posts_value: bool,
    pub verb: &'static str,
}

impl MovementKind {
    pub(crate) const fn spec(self) -> VariantSpec {
        match self {
            MovementKind::Transfer => VariantSpec {
                tag_prefix: "MT-",
                dest_kind: LocationKind::Store,
                posts_value: false,
                verb: "Transfer of",
            },
            MovementKind::Sale => VariantSpec {
                tag_prefix: "IS-",
                dest_kind: LocationKind::Customer,
                posts_value: true,
                verb: "Sale of",
            },
            MovementKind::LoanOut => VariantSpec {
                tag_prefix: "LO-",
                dest_kind: LocationKind::LoanedOut,
                posts_value: false,
                verb: "Loan of",
            },
            MovementKind::Return => VariantSpec {
                tag_prefix: "MR-",
                dest_kind: LocationKind::Supplier,
                posts_value: true,
                verb: "Return of",
            },
        }
    }

    pub fn tag_prefix(self) -> &'static str {
        self.spec().tag_prefix
    }

    pub fn posts_value(self) -> bool {
        self.spec().posts_value
    }
}

/// Movement document lifecycle. `Committed` is terminal and immutable;
/// earlier states are discardable via transaction rollback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    Draft,
    Validated,
    Committed,
}

/// One quantity transfer of an item between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLine {
    pub item: Id,
    pub quantity: u64,
    pub from_location: Id,
    pub to_location: Id,
    pub to_entity: Option<Id>,
}

/// The persistent movement document: header plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDocument {
    pub id: Id,
    pub kind: MovementKind,
    pub date: NaiveDate,
    /// Sequence number; 0 until first saved under a numbering transaction.
    pub no: u32,
    pub amendment: u32,
    pub status: MovementStatus,
    /// Set once a later revision supersedes this one.
    pub superseded: bool,
    pub remark: String,
    pub lines: Vec<MovementLine>,
}

impl MovementDocument {
    fn new(kind: MovementKind, date: NaiveDate) -> Self {
        Self {
            id: Id::new(),
            kind,
            date,
            no: 0,
            amendment: 0,
            status: MovementStatus::Draft,
            superseded: false,
            remark: String::new(),
            lines: Vec::new(),
        }
    }
}

impl StoredRecord for MovementDocument {
    fn id(&self) -> Id {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("movement has no lines"));
        }
        for line in &self.lines {
            if line.from_location == line.to_location {
                return Err(DomainError::validation(
                    "movement line locations must differ",
                ));
            }
            if line.quantity == 0 {
                return Err(DomainError::validation("movement line quantity is zero"));
            }
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

impl HasReference for MovementDocument {
    fn document_id(&self) -> Id {
        self.id
    }

    fn tag_prefix(&self) -> &str {
        self.kind.tag_prefix()
    }

    fn serial_no(&self) -> u32 {
        self.no
    }

    fn amendment(&self) -> u32 {
        self.amendment
    }
}

/// Posting targets for value-bearing movements: the value account is
/// credited, the counterpart debited, so a movement's postings balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAccounts {
    pub value: Account,
    pub counterpart: Account,
}

/// The movement engine: accumulates lines against one document, staging all
/// effects through the owning transaction.
#[derive(Debug)]
pub struct InventoryMovement {
    doc: MovementDocument,
    accounts: Option<ValueAccounts>,
    items_changed: HashMap<Id, Id>,
}

impl InventoryMovement {
    pub fn transfer(date: NaiveDate) -> Self {
        Self::with_kind(MovementKind::Transfer, date, None)
    }

    pub fn sale(date: NaiveDate, accounts: ValueAccounts) -> Self {
        Self::with_kind(MovementKind::Sale, date, Some(accounts))
    }

    pub fn loan_out(date: NaiveDate) -> Self {
        Self::with_kind(MovementKind::LoanOut, date, None)
    }

    pub fn supplier_return(date: NaiveDate, accounts: ValueAccounts) -> Self {
        Self::with_kind(MovementKind::Return, date, Some(accounts))
    }

    fn with_kind(kind: MovementKind, date: NaiveDate, accounts: Option<ValueAccounts>) -> Self {
        Self {
            doc: MovementDocument::new(kind, date),
            accounts,
            items_changed: HashMap::new(),
        }
    }

    pub fn document(&self) -> &MovementDocument {
        &self.doc
    }

    /// Items whose id changed because a partial quantity split off a new
    /// record at the destination: source id → destination id.
    pub fn items_changed(&self) -> &HashMap<Id, Id> {
        &self.items_changed
    }

    /// The committed revision of this document as the transaction sees it.
    ///
    /// The engine never marks its own copy `Committed`; terminal status
    /// lives on the staged/durable copy, so a preview or a rollback leaves
    /// the movement reusable.
    fn committed_view(&self, tx: &(impl Transaction + ?Sized)) -> Option<MovementDocument> {
        let doc: Option<MovementDocument> = get_as(tx, self.doc.id);
        doc.filter(|doc| doc.status == MovementStatus::Committed)
    }

    /// Move `quantity` of `item` to `to`.
    ///
    /// All preconditions are checked before anything is staged, so a failed
    /// call leaves the transaction without partial effects and still active.
    pub fn move_item(
        &mut self,
        tx: &mut (impl Transaction + ?Sized),
        item: &InventoryItem,
        quantity: u64,
        to: &InventoryLocation,
        to_entity: Option<Id>,
    ) -> DomainResult<()> {
        let spec = self.doc.kind.spec();
        if self.committed_view(&*tx).is_some() {
            return Err(DomainError::invalid_state("movement already committed"));
        }
        if !tx.is_active() {
            return Err(DomainError::illegal_state("transaction already closed"));
        }
        if to.kind != spec.dest_kind {
            return Err(DomainError::invalid_value(format!(
                "{:?} movement requires a {:?} destination, got {:?}",
                self.doc.kind, spec.dest_kind, to.kind
            )));
        }
        if let Some(entity) = to_entity {
            if to.entity != Some(entity) {
                return Err(DomainError::invalid_value(
                    "destination location is bound to a different entity",
                ));
            }
        }
        if quantity == 0 {
            return Err(DomainError::invalid_value("movement quantity is zero"));
        }

        // Work on the transaction's view of the item (read-your-own-writes),
        // falling back to the caller's copy for not-yet-persisted items.
        let current: InventoryItem = get_as(&*tx, item.id).unwrap_or_else(|| item.clone());
        if current.location == to.id {
            return Err(DomainError::invalid_value(
                "item is already at the destination location",
            ));
        }
        if current.quantity < quantity {
            return Err(DomainError::invalid_state(format!(
                "insufficient stock of {}: {} available, {} requested",
                current.part_number, current.quantity, quantity
            )));
        }

        // Compute the value posting up front: nothing is staged until every
        // fallible step has passed.
        let value_posting = if spec.posts_value {
            let accounts = self.accounts.as_ref().ok_or_else(|| {
                DomainError::invalid_state("value-bearing movement has no posting accounts")
            })?;
            let value = current.unit_cost.checked_mul(quantity)?;
            Some((accounts.clone(), value))
        } else {
            None
        };
        let narration = format!("{} {} x{}", spec.verb, current.part_number, quantity);
        let from_location = current.location;

        if quantity == current.quantity {
            // Whole item moves: one record changes location.
            let mut moved = current;
            moved.location = to.id;
            tx.save(Box::new(moved))?;
        } else {
            // Partial quantity: reduce the source, split a new item record
            // off at the destination.
            let mut source = current.clone();
            source.quantity -= quantity;
            let mut split = current;
            split.id = Id::new();
            split.quantity = quantity;
            split.location = to.id;
            self.items_changed.insert(item.id, split.id);
            tx.save(Box::new(source))?;
            tx.save(Box::new(split))?;
        }

        if let Some((accounts, value)) = value_posting {
            post(tx, &accounts.value, value.negated(), value.negated(), &narration)?;
            post(tx, &accounts.counterpart, value, value, &narration)?;
        }

        self.doc.lines.push(MovementLine {
            item: item.id,
            quantity,
            from_location,
            to_location: to.id,
            to_entity,
        });
        tracing::debug!(doc = %self.doc.id, kind = ?self.doc.kind, item = %item.id,
            quantity, "movement line staged");
        Ok(())
    }

    /// Validate the document and stage it for commit.
    ///
    /// Assigns the sequence number on first save, but only from a
    /// transaction that can durably commit; a preview assigns none. The
    /// staged copy carries the terminal `Committed` status; the engine's own
    /// copy stays `Validated`, so a rollback or a discarded preview leaves
    /// the movement reusable.
    pub fn save(&mut self, tx: &mut (impl Transaction + ?Sized)) -> DomainResult<()> {
        if self.committed_view(&*tx).is_some() {
            return Err(DomainError::invalid_state("movement already committed"));
        }
        self.doc.validate()?;
        self.doc.status = MovementStatus::Validated;
        if self.doc.no == 0 {
            if let Some(vault) = tx.serial_vault() {
                self.doc.no = vault.next(self.doc.kind.tag_prefix());
            }
        }
        let mut staged = self.doc.clone();
        if tx.serial_vault().is_some() {
            staged.status = MovementStatus::Committed;
        }
        tx.save(Box::new(staged))?;
        tracing::debug!(doc = %self.doc.id, no = self.doc.no, "movement document staged");
        Ok(())
    }

    /// Amend a committed document: stages a successor carrying the same
    /// sequence number with the amendment counter advanced by one, and flags
    /// the prior revision as superseded so each revision amends at most
    /// once. The prior revision stays durable and readable.
    pub fn amend(
        &self,
        tx: &mut (impl Transaction + ?Sized),
        date: NaiveDate,
    ) -> DomainResult<InventoryMovement> {
        let committed = self.committed_view(&*tx).ok_or_else(|| {
            DomainError::invalid_state("only a committed movement can be amended")
        })?;
        if committed.superseded {
            return Err(DomainError::invalid_state("revision already amended"));
        }
        // Numbered-document guard shared with reference().
        let marker = committed.amend_marker()?;

        let mut prior = committed;
        prior.superseded = true;
        tx.save(Box::new(prior))?;

        let mut successor = self.doc.clone();
        successor.id = Id::new();
        successor.date = date;
        successor.amendment = marker.amendment + 1;
        successor.status = MovementStatus::Draft;
        tx.save(Box::new(successor.clone()))?;
        Ok(InventoryMovement {
            doc: successor,
            accounts: self.accounts.clone(),
            items_changed: HashMap::new(),
        })
    }
}
