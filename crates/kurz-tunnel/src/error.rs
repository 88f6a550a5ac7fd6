//! Error types for tunnel lifecycle operations.

use thiserror::Error;

/// Result type alias for tunnel operations.
pub type Result<T> = std::result::Result<T, TunnelError>;

/// Errors that can occur while managing the tunnel child process.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The tunnel process could not be started at all.
    #[error("failed to start tunnel process '{command}': {source}")]
    Spawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The tunnel process exited before its port became reachable.
    #[error("tunnel process exited with code {code} before port {port} became ready")]
    Exited {
        /// The local tunnel port that never came up.
        port: u16,
        /// The child's exit code (-1 when killed by a signal).
        code: i32,
    },

    /// The bounded readiness poll ran out of attempts.
    #[error("port {port} did not become ready after {attempts} attempts")]
    Timeout {
        /// The local tunnel port that never came up.
        port: u16,
        /// How many connection attempts were made.
        attempts: u32,
    },

    /// The readiness probe failed with something other than refusal.
    #[error("readiness probe for port {port} failed: {source}")]
    Probe {
        /// The probed local port.
        port: u16,
        /// The fatal socket error.
        #[source]
        source: std::io::Error,
    },

    /// IO error outside the probe itself.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TunnelError {
    /// Creates a `Spawn` error for a command.
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Returns `true` when retrying with a longer deadline could help.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
