//! Error types for event automation

/// Result type alias for event-automation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while firing an automation command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external process could not be started
    #[error("failed to spawn event command: {0}")]
    Spawn(#[from] std::io::Error),
}
