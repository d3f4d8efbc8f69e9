// Panic isolation for listener callbacks
use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed successfully
    Success(T),
    /// Execution panicked
    Panicked(String),
}

impl<T> PanicGuardResult<T> {
    pub fn is_panicked(&self) -> bool {
        matches!(self, PanicGuardResult::Panicked(_))
    }
}

/// Execute a closure with panic isolation
///
/// A listener that panics must not take the drain timer down with it, nor
/// starve the listeners registered after it.
///
/// # Example
/// ```text
/// for listener in snapshot {
///     if let PanicGuardResult::Panicked(msg) =
///         execute_guarded(AssertUnwindSafe(|| listener(item)))
///     {
///         // log and move on to the next listener
///     }
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    catch_unwind(f)
        .map(PanicGuardResult::Success)
        .unwrap_or_else(|payload| PanicGuardResult::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown panic".to_string())
}
