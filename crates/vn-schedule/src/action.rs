//! `ActionQueue`: completions sent from workers to the control loop.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Multi-producer queue of typed completion messages.
///
/// Workers hold a [`Sender`] obtained from [`sender`](Self::sender) and
/// never touch agent state; the control loop calls [`drain`](Self::drain)
/// once per tick and applies the messages in the order they were sent.
pub struct ActionQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> ActionQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Messages queued so far, oldest first.  Messages sent while draining
    /// wait for the next call.
    pub fn drain(&self) -> Vec<T> {
        let pending = self.rx.len();
        self.rx.try_iter().take(pending).collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
