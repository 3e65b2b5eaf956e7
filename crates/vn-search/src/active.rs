//! Count of searches currently running.
//!
//! The admission scheduler compares [`ActiveSearches::count`] against the
//! configured limit before dispatching another search.  Every dispatched
//! search holds a [`SearchSlot`]; the count drops when the slot does, which
//! covers success, failure, cancellation and unwinding alike.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, Default)]
pub struct ActiveSearches(Arc<AtomicUsize>);

impl ActiveSearches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Reserve a slot.  The count stays raised until the slot is dropped.
    pub fn acquire(&self) -> SearchSlot {
        self.0.fetch_add(1, Ordering::SeqCst);
        SearchSlot(Arc::clone(&self.0))
    }
}

/// RAII reservation returned by [`ActiveSearches::acquire`].
#[derive(Debug)]
#[must_use = "dropping the slot immediately releases it"]
pub struct SearchSlot(Arc<AtomicUsize>);

impl Drop for SearchSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
