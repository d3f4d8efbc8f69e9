// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid drain interval: {0}")]
    InvalidInterval(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
