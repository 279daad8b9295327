//! Single-slot, latest-wins input handoff.
//!
//! Producers on other threads publish complete values; the planner takes a
//! snapshot at the start of each request and never sees a partial update.

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug)]
struct Slot<T> {
    open: bool,
    value: Option<Arc<T>>,
}

/// Cloneable handle to a shared single-value slot.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    /// Create an open, empty mailbox
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                open: true,
                value: None,
            })),
        }
    }

    /// Replace the stored value.
    ///
    /// Returns false (and drops `value`) when the mailbox is closed.
    pub fn publish(&self, value: T) -> bool {
        let mut slot = self.slot.lock();
        if !slot.open {
            return false;
        }
        slot.value = Some(Arc::new(value));
        true
    }

    /// Most recent value, if any
    pub fn latest(&self) -> Option<Arc<T>> {
        self.slot.lock().value.clone()
    }

    pub fn has_value(&self) -> bool {
        self.slot.lock().value.is_some()
    }

    /// Drop the stored value
    pub fn clear(&self) {
        self.slot.lock().value = None;
    }

    /// Stop accepting values and drop the stored one
    pub(crate) fn close(&self) {
        let mut slot = self.slot.lock();
        slot.open = false;
        slot.value = None;
    }

    pub(crate) fn open(&self) {
        self.slot.lock().open = true;
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().open
    }
}
