//! Link lock
//!
//! The logger answers one command at a time, so only one session may talk to
//! it. A [`LinkLock`] is shared by everything that opens sessions (clones
//! share the same lock) and hands out a [`LinkLease`] to the session that
//! currently owns the link.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Mutual exclusion of open device sessions
#[derive(Debug, Clone, Default)]
pub struct LinkLock {
    inner: Arc<Mutex<()>>,
}

impl LinkLock {
    /// Create a free lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other session holds the link
    pub async fn acquire(&self) -> LinkLease {
        trace!("acquiring link lock");
        let guard = self.inner.clone().lock_owned().await;
        trace!("link lock acquired");
        LinkLease { guard: Some(guard) }
    }

    /// Take the link if it is free
    pub fn try_acquire(&self) -> Option<LinkLease> {
        self.inner
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| LinkLease { guard: Some(guard) })
    }

    /// Check whether a session currently holds the link
    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

/// Proof of holding the link. Dropping the lease releases it.
#[derive(Debug)]
pub struct LinkLease {
    guard: Option<OwnedMutexGuard<()>>,
}

impl LinkLease {
    /// Release the link. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if self.guard.take().is_some() {
            trace!("link lock released");
        }
    }

    /// Check whether the lease still holds the link
    pub fn is_held(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for LinkLease {
    fn drop(&mut self) {
        self.release();
    }
}
