//! Error types for the session layer

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort the session setup or teardown.
///
/// Failures inside the running loop never surface here: the session renders
/// them as user-visible error lines and falls back to a safe state instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither configuration, prompt nor helper produced credentials
    #[error("missing login credentials")]
    MissingCredentials,

    /// The configured password helper command failed
    #[error("password helper failed: {0}")]
    PasswordHelper(String),

    /// A remote operation failed during session setup
    #[error(transparent)]
    Proto(#[from] rbproto::Error),

    /// Configuration access failed
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// State file could not be serialized
    #[error("state file error: {0}")]
    State(#[from] serde_yaml::Error),

    /// I/O failure (state file, prompts)
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
