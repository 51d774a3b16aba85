//! Per-tag sequence numbers.

use std::collections::HashMap;
use std::sync::Mutex;

/// Monotonically increasing sequence source, one counter per tag.
///
/// A number, once handed out, is never reissued: a document whose transaction
/// rolls back burns its number, so gaps in a sequence are normal. Ownership is
/// explicit (the transaction manager holds the vault); there is no hidden
/// global state.
#[derive(Debug, Default)]
pub struct SerialVault {
    counters: Mutex<HashMap<String, u32>>,
}

impl SerialVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number for the tag, starting at 1.
    pub fn next(&self, tag: &str) -> u32 {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let counter = counters.entry(tag.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Last number handed out for the tag (0 if none yet).
    pub fn current(&self, tag: &str) -> u32 {
        let counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters.get(tag).copied().unwrap_or(0)
    }
}
