// Periodic Timer Port
// Abstraction over a cancellable, rearmable periodic scheduler

use crate::error::{AppError, Result};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Callback invoked once per tick
pub type TickFn = Box<dyn Fn() + Send + Sync + 'static>;

/// Periodic timer trait
///
/// Implementations:
/// - TokioTimer: spawns a task on the current tokio runtime
/// - mocks::ManualTimer: ticks are fired by hand (tests)
pub trait PeriodicTimer: Send + Sync {
    /// Arm a timer whose first tick fires one full `period` after this call
    ///
    /// # Errors
    /// - AppError::Runtime if the scheduler is unavailable
    fn arm(&self, period: Duration, on_tick: TickFn) -> Result<Box<dyn TimerHandle>>;
}

/// Handle to one armed timer
pub trait TimerHandle: Send {
    /// Stop the timer. Idempotent.
    fn cancel(&self);
}

/// Tokio-backed timer (production)
///
/// The runtime handle is captured once, at construction when built inside a
/// runtime or else on the first successful `arm`. Every later arm spawns on
/// that handle, so the caller's thread needs no runtime of its own.
///
/// Missed ticks are delayed rather than burst, so a stalled runtime never
/// produces a catch-up volley of drains.
#[derive(Debug, Default, Clone)]
pub struct TokioTimer {
    runtime: OnceLock<Handle>,
}

impl TokioTimer {
    /// Captures the current runtime if there is one
    pub fn new() -> Self {
        let runtime = OnceLock::new();
        if let Ok(handle) = Handle::try_current() {
            let _ = runtime.set(handle);
        }
        Self { runtime }
    }

    pub fn with_handle(handle: Handle) -> Self {
        let runtime = OnceLock::new();
        let _ = runtime.set(handle);
        Self { runtime }
    }

    fn runtime(&self) -> Result<Handle> {
        if let Some(handle) = self.runtime.get() {
            return Ok(handle.clone());
        }
        let current = Handle::try_current()
            .map_err(|e| AppError::Runtime(format!("cannot arm drain timer: {}", e)))?;
        Ok(self.runtime.get_or_init(|| current).clone())
    }
}

impl PeriodicTimer for TokioTimer {
    fn arm(&self, period: Duration, on_tick: TickFn) -> Result<Box<dyn TimerHandle>> {
        let runtime = self.runtime()?;

        // Measured from the arm call on the runtime's clock
        let first_tick = {
            let _context = runtime.enter();
            Instant::now() + period
        };
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        Ok(Box::new(TokioTimerHandle { task }))
    }
}

struct TokioTimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct ArmedTimer {
        period: Duration,
        on_tick: Arc<dyn Fn() + Send + Sync>,
        cancelled: Arc<AtomicBool>,
    }

    /// Manual timer: nothing ticks until the test calls `fire`
    #[derive(Clone, Default)]
    pub struct ManualTimer {
        armed: Arc<Mutex<Vec<ArmedTimer>>>,
        refuse_arm: Arc<AtomicBool>,
    }

    impl ManualTimer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every following `arm` fail with AppError::Runtime
        pub fn set_refuse_arm(&self, refuse: bool) {
            self.refuse_arm.store(refuse, Ordering::SeqCst);
        }

        /// Fire one tick on every live timer, returns how many fired
        pub fn fire(&self) -> usize {
            self.fire_where(false)
        }

        /// Fire the callbacks of cancelled timers, as if their tick was
        /// already queued at the scheduler when `cancel` ran
        pub fn fire_cancelled(&self) -> usize {
            self.fire_where(true)
        }

        /// Timers armed and not yet cancelled
        pub fn live_count(&self) -> usize {
            self.armed
                .lock()
                .unwrap()
                .iter()
                .filter(|t| !t.cancelled.load(Ordering::SeqCst))
                .count()
        }

        /// Timers ever armed
        pub fn armed_count(&self) -> usize {
            self.armed.lock().unwrap().len()
        }

        /// Period of the most recently armed timer
        pub fn last_period(&self) -> Option<Duration> {
            self.armed.lock().unwrap().last().map(|t| t.period)
        }

        fn fire_where(&self, cancelled: bool) -> usize {
            let callbacks: Vec<_> = self
                .armed
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.cancelled.load(Ordering::SeqCst) == cancelled)
                .map(|t| Arc::clone(&t.on_tick))
                .collect();
            for callback in &callbacks {
                callback();
            }
            callbacks.len()
        }
    }

    impl PeriodicTimer for ManualTimer {
        fn arm(&self, period: Duration, on_tick: TickFn) -> Result<Box<dyn TimerHandle>> {
            if self.refuse_arm.load(Ordering::SeqCst) {
                return Err(AppError::Runtime("manual timer refused to arm".to_string()));
            }
            let cancelled = Arc::new(AtomicBool::new(false));
            self.armed.lock().unwrap().push(ArmedTimer {
                period,
                on_tick: Arc::from(on_tick),
                cancelled: Arc::clone(&cancelled),
            });
            Ok(Box::new(ManualTimerHandle { cancelled }))
        }
    }

    struct ManualTimerHandle {
        cancelled: Arc<AtomicBool>,
    }

    impl TimerHandle for ManualTimerHandle {
        fn cancel(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    impl Drop for ManualTimerHandle {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}
