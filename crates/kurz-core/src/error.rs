//! Error types for shorthand resolution.
//!
//! Every resolution-stage error is produced before any external process is
//! spawned; the dispatcher never constructs a partial invocation on failure.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors that can occur while resolving a shorthand token into an invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The first token segment matched no resource alias and no pass-through verb.
    #[error("unknown resource '{token}'")]
    UnknownResource {
        /// The token segment that failed to resolve.
        token: String,
    },

    /// The resource resolved but no action matched the suffix.
    #[error("unknown action '{suffix}' for resource '{resource}'")]
    UnknownAction {
        /// The canonical resource the token resolved to.
        resource: String,
        /// The action suffix that failed to resolve.
        suffix: String,
    },

    /// The residual arguments do not fit the action's argument shape.
    #[error("invalid arguments for '{action}': {reason}")]
    ArgumentMismatch {
        /// The action (full token form) whose arguments were rejected.
        action: String,
        /// What was wrong, naming the offending argument(s).
        reason: String,
    },

    /// Reading or writing the persisted namespace state failed.
    #[error("namespace state error at {path}: {source}")]
    NamespaceIo {
        /// The backing state location.
        path: String,
        /// The underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A literal duplicate was found while building the alias or action table.
    #[error("duplicate table entry '{key}'")]
    DuplicateEntry {
        /// The addressable key that appeared twice.
        key: String,
    },

    /// IO failure while writing output or handing off to the executor.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Creates an `UnknownResource` error for a token.
    #[must_use]
    pub fn unknown_resource(token: impl Into<String>) -> Self {
        Self::UnknownResource {
            token: token.into(),
        }
    }

    /// Creates an `UnknownAction` error for a resolved resource and suffix.
    #[must_use]
    pub fn unknown_action(resource: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::UnknownAction {
            resource: resource.into(),
            suffix: suffix.into(),
        }
    }

    /// Creates an `ArgumentMismatch` error naming the offending arguments.
    #[must_use]
    pub fn argument_mismatch(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `NamespaceIo` error for the given state location.
    #[must_use]
    pub fn namespace_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::NamespaceIo {
            path: path.into(),
            source,
        }
    }

    /// Creates a `DuplicateEntry` error for a table key.
    #[must_use]
    pub fn duplicate_entry(key: impl Into<String>) -> Self {
        Self::DuplicateEntry { key: key.into() }
    }

    /// Returns `true` if this error is a resolution failure (unknown alias,
    /// unknown action, or argument mismatch) as opposed to a state IO failure.
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownResource { .. }
                | Self::UnknownAction { .. }
                | Self::ArgumentMismatch { .. }
        )
    }
}
