//! Engine error taxonomy
//!
//! Only startup can fail. Collisions that end a run are state transitions,
//! never errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The input device (terminal, camera) could not be opened
    #[error("input unavailable: {0}")]
    InputUnavailable(String),
    /// A configuration value breaks an engine invariant
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
