// Listener Registry - observer lists per notification kind

use super::lock_unpoisoned;
use super::panic_guard::{execute_guarded, PanicGuardResult};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::error;

/// Observer callback
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Identifies a registered listener for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outbound notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueEvent {
    /// Item appended to the tail
    Enqueued,
    /// Item removed from the head by a drain tick
    Dequeued,
}

impl std::fmt::Display for QueueEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueEvent::Enqueued => write!(f, "enqueued"),
            QueueEvent::Dequeued => write!(f, "dequeued"),
        }
    }
}

struct Entry<T> {
    id: ListenerId,
    event: QueueEvent,
    listener: Listener<T>,
}

/// Registered listeners, invoked synchronously in registration order
pub(crate) struct Listeners<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<T>>>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, event: QueueEvent, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock_unpoisoned(&self.entries).push(Entry {
            id,
            event,
            listener,
        });
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = lock_unpoisoned(&self.entries);
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    pub(crate) fn clear(&self) {
        lock_unpoisoned(&self.entries).clear();
    }

    pub(crate) fn count(&self, event: QueueEvent) -> usize {
        lock_unpoisoned(&self.entries)
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    /// Deliver `item` to every listener of `event`
    ///
    /// The list is snapshotted first, so listeners may register, remove or
    /// call back into the queue while being notified.
    pub(crate) fn emit(&self, event: QueueEvent, item: &T) {
        let snapshot: Vec<Listener<T>> = lock_unpoisoned(&self.entries)
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        for listener in snapshot {
            if let PanicGuardResult::Panicked(panic_msg) =
                execute_guarded(AssertUnwindSafe(|| listener(item)))
            {
                error!(event = %event, panic_msg = %panic_msg, "Queue listener panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Listener<i32>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_make = Arc::clone(&log);
        let make = move |tag: &'static str| -> Listener<i32> {
            let log = Arc::clone(&log_for_make);
            Arc::new(move |item: &i32| log.lock().unwrap().push(format!("{}:{}", tag, item)))
        };
        (log, make)
    }

    #[test]
    fn test_emit_in_registration_order() {
        let listeners = Listeners::new();
        let (log, make) = recorder();

        listeners.add(QueueEvent::Enqueued, make("a"));
        listeners.add(QueueEvent::Enqueued, make("b"));
        listeners.add(QueueEvent::Dequeued, make("c"));

        listeners.emit(QueueEvent::Enqueued, &1);
        listeners.emit(QueueEvent::Dequeued, &2);

        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "c:2"]);
    }

    #[test]
    fn test_remove_single_listener() {
        let listeners = Listeners::new();
        let (log, make) = recorder();

        let first = listeners.add(QueueEvent::Enqueued, make("a"));
        listeners.add(QueueEvent::Enqueued, make("b"));

        assert!(listeners.remove(first));
        assert!(!listeners.remove(first));
        assert_eq!(listeners.count(QueueEvent::Enqueued), 1);

        listeners.emit(QueueEvent::Enqueued, &5);
        assert_eq!(*log.lock().unwrap(), vec!["b:5"]);
    }

    #[test]
    fn test_clear_drops_every_kind() {
        let listeners = Listeners::new();
        let (_, make) = recorder();

        listeners.add(QueueEvent::Enqueued, make("a"));
        listeners.add(QueueEvent::Dequeued, make("b"));
        listeners.clear();

        assert_eq!(listeners.count(QueueEvent::Enqueued), 0);
        assert_eq!(listeners.count(QueueEvent::Dequeued), 0);
    }

    #[test]
    fn test_panicking_listener_does_not_starve_others() {
        let listeners = Listeners::new();
        let (log, make) = recorder();

        listeners.add(QueueEvent::Dequeued, Arc::new(|_: &i32| panic!("boom")));
        listeners.add(QueueEvent::Dequeued, make("after"));

        listeners.emit(QueueEvent::Dequeued, &9);
        assert_eq!(*log.lock().unwrap(), vec!["after:9"]);
    }
}
