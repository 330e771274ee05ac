//! Crate error type

use crate::pty::PtyError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The child process could not be started
    #[error("Failed to start terminal session: {0}")]
    Spawn(#[source] PtyError),

    /// Writing to or resizing a running session failed
    #[error("PTY error: {0}")]
    Pty(#[from] PtyError),

    #[error("Terminal is not running")]
    NotRunning,

    #[error("Terminal is already running")]
    AlreadyRunning,

    #[error("Invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },

    #[error("Failed to spawn reader thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
