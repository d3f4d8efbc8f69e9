// drainq Core - Domain, Ports & the drain queue
// NO host wiring: the queue is consumed in-process by whoever feeds it

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{AsyncDrainQueue, ListenerId, QueueEvent};
pub use config::QueueConfig;
pub use domain::{DrainInterval, RunState};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
