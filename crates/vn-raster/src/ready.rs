//! One-shot "graph ready" notification.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct State {
    fired:       bool,
    subscribers: Vec<Sender<()>>,
}

/// Fires at most once.  Consumers may block on it, poll it, or hold a
/// channel that receives exactly one message.
#[derive(Default)]
pub struct ReadySignal {
    state: Mutex<State>,
    cond:  Condvar,
}

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().fired
    }

    /// Fire the signal.  Returns `false` if it had already fired.
    pub fn fire(&self) -> bool {
        let mut state = self.state.lock();
        if state.fired {
            return false;
        }
        state.fired = true;
        for tx in state.subscribers.drain(..) {
            // A dropped receiver just means nobody is listening any more.
            let _ = tx.send(());
        }
        self.cond.notify_all();
        true
    }

    /// A receiver that gets one message when the signal fires (immediately
    /// if it already has).
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = bounded(1);
        let mut state = self.state.lock();
        if state.fired {
            let _ = tx.send(());
        } else {
            state.subscribers.push(tx);
        }
        rx
    }

    /// Block until the signal fires or `timeout` elapses.  Returns whether it
    /// fired.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.fired {
            if self.cond.wait_until(&mut state, deadline).timed_out() {
                return state.fired;
            }
        }
        true
    }
}
