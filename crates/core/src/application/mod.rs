// Application Layer - the drain queue and its notification plumbing

mod listeners;
mod panic_guard;
pub mod queue;

// Re-exports
pub use listeners::{Listener, ListenerId, QueueEvent};
pub use panic_guard::{execute_guarded, PanicGuardResult};
pub use queue::AsyncDrainQueue;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Every critical section leaves its data consistent, so a poisoned lock is
/// still safe to use.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
