//! Registry of ready consumers.

use relay_protocol_types::ConsumerHandle;
use std::collections::BTreeSet;
use tracing::debug;

/// Consumers that declared readiness and have not been reported gone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsumerRegistry {
    ready: BTreeSet<ConsumerHandle>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert. Returns `true` if the handle was new.
    pub fn mark_ready(&mut self, handle: ConsumerHandle) -> bool {
        let added = self.ready.insert(handle.clone());
        if added {
            debug!(consumer = %handle, "Consumer ready");
        }
        added
    }

    /// Idempotent removal. Returns `true` if the handle was present.
    pub fn mark_gone(&mut self, handle: &ConsumerHandle) -> bool {
        let removed = self.ready.remove(handle);
        if removed {
            debug!(consumer = %handle, "Consumer gone");
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn contains(&self, handle: &ConsumerHandle) -> bool {
        self.ready.contains(handle)
    }

    /// Snapshot of the ready handles.
    pub fn handles(&self) -> Vec<ConsumerHandle> {
        self.ready.iter().cloned().collect()
    }
}
