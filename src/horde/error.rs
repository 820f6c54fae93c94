// src/horde/error.rs

use super::core::{Anchor, SpawnSpec};

#[derive(thiserror::Error, Debug)]
pub enum HordeError {
    #[error("No eligible anchor found")]
    NoCandidate,
    #[error("Anchor {0:?} already has an armed horde")]
    AlreadyArmed(Anchor),
    #[error("Failed to spawn '{spec}': {reason}")]
    SpawnCreationFailed { spec: SpawnSpec, reason: String },
    #[error("Invalid throw parameters: {0}")]
    InvalidThrowParams(String),
    #[error("Unknown spawn table '{0}'")]
    UnknownTable(String),
    #[error("Duplicate spawn table '{0}'")]
    DuplicateTable(String),
    #[error("I/O while reading horde data: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
}
