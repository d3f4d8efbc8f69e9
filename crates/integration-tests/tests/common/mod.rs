// Shared helpers for integration tests

#![allow(dead_code)]

use drainq_core::{AsyncDrainQueue, QueueEvent};
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per binary (RUST_LOG controls level)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Records every payload delivered for one notification kind
#[derive(Clone, Default)]
pub struct Spy {
    calls: Arc<Mutex<Vec<i64>>>,
}

impl Spy {
    pub fn attach(queue: &AsyncDrainQueue<i64>, event: QueueEvent) -> Self {
        let spy = Self::default();
        let calls = Arc::clone(&spy.calls);
        queue.add_listener(
            event,
            Arc::new(move |item: &i64| calls.lock().unwrap().push(*item)),
        );
        spy
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}
