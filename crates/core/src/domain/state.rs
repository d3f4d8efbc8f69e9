// Run State Domain Model

use serde::{Deserialize, Serialize};

/// Drain state of a queue
///
/// A paused queue is simply `Stopped`; its buffer is kept and `start()`
/// picks up from wherever the head is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Stopped => write!(f, "STOPPED"),
            RunState::Running => write!(f, "RUNNING"),
        }
    }
}
