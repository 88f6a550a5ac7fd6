//! # kurz-core
//!
//! Shorthand resolution engine for the `kurz` front-end: terse dot-delimited
//! tokens (`po.del`, `no.top`) are resolved against a resource alias table
//! and a per-resource action registry, the persisted current namespace is
//! injected, and the equivalent long-form `kubectl` invocation is assembled
//! for the execution boundary.
//!
//! # Architecture
//!
//! ```text
//! token + args ──► Dispatcher ──► Invocation ──► Executor ──► kubectl
//!                    │  │  │
//!          AliasTable┘  │  └─NamespaceStore (persisted current namespace)
//!               ActionRegistry
//! ```
//!
//! The dispatcher performs no IO of its own besides reading the namespace
//! store; every resolution failure is produced before anything executes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actions;
pub mod alias;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod invocation;
pub mod namespace;

pub use actions::{ActionRegistry, ActionSpec, ArgShape, Scope};
pub use alias::{AliasEntry, AliasTable};
pub use config::Config;
pub use dispatch::{Dispatcher, Outcome};
pub use error::{DispatchError, Result};
pub use invocation::{Executor, Invocation, ProgramExecutor, SpyExecutor};
pub use namespace::{FileStore, MemoryStore, NamespaceStore, DEFAULT_NAMESPACE};
