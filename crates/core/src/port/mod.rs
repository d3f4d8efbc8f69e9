// Port Layer - Interfaces for external dependencies

pub mod timer;

// Re-exports
pub use timer::{PeriodicTimer, TickFn, TimerHandle, TokioTimer};
