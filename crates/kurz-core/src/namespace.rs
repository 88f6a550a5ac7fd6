//! Persisted current-namespace state.
//!
//! The store is an injected dependency of the dispatcher rather than
//! ambient global state, so tests can run against an in-memory double.
//! Reads are total: a missing, empty, or unreadable backing location
//! resolves to the default namespace. Only the explicit `use` action
//! writes; concurrent writers are last-one-wins by design.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{DispatchError, Result};

/// Namespace used when no state has been persisted.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read/write access to the persisted current namespace.
pub trait NamespaceStore {
    /// Returns the current namespace, falling back to [`DEFAULT_NAMESPACE`]
    /// when no usable state exists. Never fails.
    fn read(&self) -> String;

    /// Persists a new current namespace.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NamespaceIo`] if the backing location cannot
    /// be written. The failure is surfaced, not retried.
    fn write(&self, namespace: &str) -> Result<()>;

    /// Resolves the effective namespace for one invocation.
    ///
    /// An explicit per-invocation override wins over the persisted value and
    /// is never written back.
    fn resolve(&self, explicit: Option<&str>) -> String {
        match explicit {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => self.read(),
        }
    }
}

/// Namespace store backed by a plain file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store over the given state path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing state path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NamespaceStore for FileStore {
    fn read(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let ns = contents.trim();
                if ns.is_empty() {
                    DEFAULT_NAMESPACE.to_string()
                } else {
                    ns.to_string()
                }
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no usable namespace state");
                DEFAULT_NAMESPACE.to_string()
            }
        }
    }

    fn write(&self, namespace: &str) -> Result<()> {
        fs::write(&self.path, namespace)
            .map_err(|e| DispatchError::namespace_io(self.path.display().to_string(), e))
    }
}

/// In-memory namespace store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    current: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store (reads resolve to the default namespace).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a persisted namespace.
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(Some(namespace.into())),
        }
    }
}

impl NamespaceStore for MemoryStore {
    fn read(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    fn write(&self, namespace: &str) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(namespace.to_string());
        Ok(())
    }
}
