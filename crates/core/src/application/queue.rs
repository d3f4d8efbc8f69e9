// Async Drain Queue - FIFO buffer drained one item per timer tick

use super::listeners::{Listener, ListenerId, Listeners, QueueEvent};
use super::lock_unpoisoned;
use crate::config::QueueConfig;
use crate::domain::{DrainInterval, RunState};
use crate::error::Result;
use crate::port::{PeriodicTimer, TimerHandle, TokioTimer};
use parking_lot::ReentrantMutex;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// In-memory FIFO queue drained by a pausable periodic timer
///
/// - `enqueue` appends and notifies `Enqueued` listeners immediately,
///   whatever the run state.
/// - While running, every tick removes exactly one head item and notifies
///   `Dequeued` listeners. Ticks on an empty buffer do nothing.
/// - `pause` cancels the timer; no dequeue notification fires after it
///   returns.
///
/// Cloning yields another handle to the same queue. The timer needs a tokio
/// runtime, captured when the queue is built inside one or else on the first
/// `start`; after that every operation may be called from any thread.
///
/// Listeners run synchronously while the queue's notification lock is held.
/// That lock keeps every observer's view in buffer order and makes `pause`
/// exact, but a slow listener delays `enqueue`, `start`, `pause` and
/// `set_interval` on other threads (and the `Dequeued` listener runs on a
/// runtime worker). Listeners should hand heavy work off, e.g. to a channel.
pub struct AsyncDrainQueue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    /// Serializes mutate-then-notify sections across threads. Reentrant so a
    /// listener may call back into the queue.
    serial: ReentrantMutex<()>,
    listeners: Listeners<T>,
    timer: Arc<dyn PeriodicTimer>,
}

struct State<T> {
    buffer: VecDeque<T>,
    interval: DrainInterval,
    run_state: RunState,
    /// Generation of the armed timer; ticks carrying an older value are stale
    epoch: u64,
    timer: Option<Box<dyn TimerHandle>>,
}

impl<T> State<T> {
    fn cancel_timer(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

impl<T> Inner<T> {
    fn drain_tick(&self, epoch: u64) {
        let _serial = self.serial.lock();

        let item = {
            let mut state = lock_unpoisoned(&self.state);
            if state.epoch != epoch || !state.run_state.is_running() {
                trace!(
                    tick_epoch = epoch,
                    current_epoch = state.epoch,
                    "Stale drain tick discarded"
                );
                return;
            }
            match state.buffer.pop_front() {
                Some(item) => {
                    debug!(remaining = state.buffer.len(), "Item drained");
                    item
                }
                None => {
                    trace!("Drain tick skipped: buffer empty");
                    return;
                }
            }
        };

        self.listeners.emit(QueueEvent::Dequeued, &item);
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel_timer();
    }
}

impl<T> AsyncDrainQueue<T>
where
    T: Clone + Send + 'static,
{
    /// Stopped queue with the default 250ms interval on the tokio timer
    pub fn new() -> Self {
        Self::with_timer(Arc::new(TokioTimer::new()), DrainInterval::default())
    }

    pub fn with_config(config: &QueueConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_timer(Arc::new(TokioTimer::new()), config.interval()?))
    }

    pub fn with_timer(timer: Arc<dyn PeriodicTimer>, interval: DrainInterval) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    buffer: VecDeque::new(),
                    interval,
                    run_state: RunState::Stopped,
                    epoch: 0,
                    timer: None,
                }),
                serial: ReentrantMutex::new(()),
                listeners: Listeners::new(),
                timer,
            }),
        }
    }

    /// Append `item` to the tail and notify `Enqueued` listeners
    pub fn enqueue(&self, item: T) {
        let _serial = self.inner.serial.lock();

        let queue_len = {
            let mut state = lock_unpoisoned(&self.inner.state);
            state.buffer.push_back(item.clone());
            state.buffer.len()
        };
        debug!(queue_len, "Item enqueued");

        self.inner.listeners.emit(QueueEvent::Enqueued, &item);
    }

    /// Head item, left in place
    pub fn peek(&self) -> Option<T> {
        lock_unpoisoned(&self.inner.state).buffer.front().cloned()
    }

    /// Ordered copy of the whole buffer
    pub fn snapshot(&self) -> Vec<T> {
        lock_unpoisoned(&self.inner.state)
            .buffer
            .iter()
            .cloned()
            .collect()
    }

    /// Alias of [`snapshot`](Self::snapshot)
    pub fn print(&self) -> Vec<T> {
        self.snapshot()
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.inner.state).buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        lock_unpoisoned(&self.inner.state).buffer.is_empty()
    }

    pub fn current_interval(&self) -> Duration {
        lock_unpoisoned(&self.inner.state).interval.as_duration()
    }

    pub fn run_state(&self) -> RunState {
        lock_unpoisoned(&self.inner.state).run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state().is_running()
    }

    /// Begin draining; the first tick fires one full interval from now
    ///
    /// No-op when already running.
    ///
    /// # Errors
    /// - AppError::Runtime if the timer cannot be armed (queue stays stopped)
    pub fn start(&self) -> Result<()> {
        let _serial = self.inner.serial.lock();
        let mut state = lock_unpoisoned(&self.inner.state);

        if state.run_state.is_running() {
            debug!("Start ignored: queue already running");
            return Ok(());
        }

        self.arm(&mut state)?;
        state.run_state = RunState::Running;

        info!(
            interval = %state.interval,
            queue_len = state.buffer.len(),
            "Drain started"
        );
        Ok(())
    }

    /// Stop draining and cancel the timer; the buffer is kept
    ///
    /// No-op when already stopped. Once this returns, no further
    /// `Dequeued` notification fires until the next `start`.
    pub fn pause(&self) {
        let _serial = self.inner.serial.lock();
        let mut state = lock_unpoisoned(&self.inner.state);

        if !state.run_state.is_running() {
            debug!("Pause ignored: queue already stopped");
            return;
        }

        state.cancel_timer();
        state.run_state = RunState::Stopped;

        info!(queue_len = state.buffer.len(), "Drain paused");
    }

    /// Replace the drain interval
    ///
    /// While running, the timer is rearmed so the next tick lands one full
    /// new period from now. A zero period is rejected and changes nothing.
    ///
    /// # Errors
    /// - AppError::Domain if `period` is zero
    /// - AppError::Runtime if rearming fails (queue falls back to stopped)
    pub fn set_interval(&self, period: Duration) -> Result<()> {
        let interval = DrainInterval::new(period).map_err(|e| {
            warn!(period = ?period, "Rejected drain interval");
            e
        })?;

        let _serial = self.inner.serial.lock();
        let mut state = lock_unpoisoned(&self.inner.state);
        state.interval = interval;

        let running = state.run_state.is_running();
        if running {
            if let Err(e) = self.arm(&mut state) {
                state.run_state = RunState::Stopped;
                warn!(error = %e, "Drain timer rearm failed, queue stopped");
                return Err(e);
            }
        }

        info!(
            interval = %interval,
            rearmed = running,
            "Drain interval updated"
        );
        Ok(())
    }

    /// Inbound interval-change notification (milliseconds)
    pub fn on_interval_change(&self, interval_ms: u64) -> Result<()> {
        self.set_interval(Duration::from_millis(interval_ms))
    }

    pub fn on_enqueued<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.add_listener(QueueEvent::Enqueued, Arc::new(listener))
    }

    pub fn on_dequeued<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.add_listener(QueueEvent::Dequeued, Arc::new(listener))
    }

    pub fn add_listener(&self, event: QueueEvent, listener: Listener<T>) -> ListenerId {
        self.inner.listeners.add(event, listener)
    }

    /// Returns false if `id` was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    pub fn remove_all_listeners(&self) {
        self.inner.listeners.clear();
    }

    pub fn listener_count(&self, event: QueueEvent) -> usize {
        self.inner.listeners.count(event)
    }

    /// Cancel any armed timer and arm a fresh one at the stored interval
    fn arm(&self, state: &mut State<T>) -> Result<()> {
        state.cancel_timer();
        let epoch = state.epoch;

        let queue = Arc::downgrade(&self.inner);
        let handle = self.inner.timer.arm(
            state.interval.as_duration(),
            Box::new(move || {
                if let Some(inner) = queue.upgrade() {
                    inner.drain_tick(epoch);
                }
            }),
        )?;

        state.timer = Some(handle);
        Ok(())
    }
}

impl<T> Default for AsyncDrainQueue<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncDrainQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for AsyncDrainQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_unpoisoned(&self.inner.state);
        f.debug_struct("AsyncDrainQueue")
            .field("run_state", &state.run_state)
            .field("interval", &state.interval)
            .field("len", &state.buffer.len())
            .finish()
    }
}
