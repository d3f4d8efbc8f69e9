// Domain Layer - Pure value types for the drain queue

pub mod error;
pub mod interval;
pub mod state;

// Re-exports
pub use error::DomainError;
pub use interval::{DrainInterval, DEFAULT_INTERVAL_MS};
pub use state::RunState;
