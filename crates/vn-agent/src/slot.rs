//! Double-buffered path storage.
//!
//! A [`PathSlot`] holds an `Arc<Vec<Vec3>>` behind a mutex.  Writers build
//! a complete vector off to the side and swap it in; readers clone the
//! `Arc`.  The lock is only held for the pointer swap or clone, so a reader
//! never observes a half-written path.

use std::sync::Arc;

use parking_lot::Mutex;

use vn_core::Vec3;

/// Shared handle to one path.  Clones refer to the same slot.
#[derive(Clone, Debug, Default)]
pub struct PathSlot(Arc<Mutex<Arc<Vec<Vec3>>>>);

impl PathSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents.
    pub fn publish(&self, path: Vec<Vec3>) {
        *self.0.lock() = Arc::new(path);
    }

    /// The current contents.  Later publishes do not affect the returned
    /// value.
    pub fn snapshot(&self) -> Arc<Vec<Vec3>> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.publish(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}
