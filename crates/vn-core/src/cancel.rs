//! Cooperative cancellation.
//!
//! Long-running work (search expansion, triangle sweeps, path processing)
//! receives a [`CancelToken`] and polls it at fixed checkpoints.  Nothing is
//! ever forcibly stopped: a cancelled task simply returns early.
//!
//! A [`CancelScope`] is owned by whoever issues work.  Renewing the scope
//! cancels every token handed out so far and starts a fresh one, so work
//! issued before the renewal can never be confused with work issued after.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.  Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Idempotent.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The issuing side of a series of cancellation tokens.
#[derive(Debug, Default)]
pub struct CancelScope {
    current: CancelToken,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token tied to the current scope.
    pub fn token(&self) -> CancelToken {
        self.current.clone()
    }

    /// Cancel the current token without starting a new one.
    pub fn cancel(&self) {
        self.current.cancel();
    }

    /// Cancel the current token and replace it with a fresh one.
    pub fn renew(&mut self) {
        self.current.cancel();
        self.current = CancelToken::new();
    }
}
