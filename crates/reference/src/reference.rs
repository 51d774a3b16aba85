//! Reference numbers and amendment markers.

use serde::{Deserialize, Serialize};

use stagepost_core::{DomainError, DomainResult, Id};

/// Zero-pad width of the sequence part of a reference.
const SERIAL_WIDTH: usize = 6;

/// Human-readable document number.
///
/// Displays as `tag_prefix` + zero-padded sequence, with `/amendment`
/// appended for revised documents: `MT-000042`, `IS-000007/2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub tag_prefix: String,
    pub no: u32,
    pub amendment: u32,
}

impl core::fmt::Display for Reference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{:0width$}", self.tag_prefix, self.no, width = SERIAL_WIDTH)?;
        if self.amendment > 0 {
            write!(f, "/{}", self.amendment)?;
        }
        Ok(())
    }
}

/// Amendment marker: a document plus its current revision counter.
///
/// Counters start at 0 and only ever increase, one step per actual
/// amendment; reading the marker never bumps it. Prior revisions stay
/// readable for the audit trail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amend {
    pub object: Id,
    pub amendment: u32,
}

/// Implemented by documents carrying an externally visible reference number.
pub trait HasReference {
    /// Identity of the owning document.
    fn document_id(&self) -> Id;

    /// Variant tag, e.g. `"MT-"`.
    fn tag_prefix(&self) -> &str;

    /// Assigned sequence number; 0 while the document has never been
    /// committed under a numbering transaction.
    fn serial_no(&self) -> u32;

    /// Current amendment counter (0 for the original issue).
    fn amendment(&self) -> u32;

    /// The document's reference number.
    ///
    /// Fails with `InvalidState` while no sequence number is assigned.
    fn reference(&self) -> DomainResult<Reference> {
        if self.serial_no() == 0 {
            return Err(DomainError::invalid_state(
                "document has no sequence number yet",
            ));
        }
        Ok(Reference {
            tag_prefix: self.tag_prefix().to_string(),
            no: self.serial_no(),
            amendment: self.amendment(),
        })
    }

    /// Marker `(document, current amendment)` for the revision trail.
    ///
    /// Fails with `InvalidState` on an unnumbered document: there is nothing
    /// to amend before the first commit.
    fn amend_marker(&self) -> DomainResult<Amend> {
        if self.serial_no() == 0 {
            return Err(DomainError::invalid_state(
                "document has no sequence number yet",
            ));
        }
        Ok(Amend {
            object: self.document_id(),
            amendment: self.amendment(),
        })
    }
}
