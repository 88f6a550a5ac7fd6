//! # kurz-cli
//!
//! Binaries for the kurz shorthand layer:
//!
//! - `kurz` — resolves shorthand tokens (`po.del`, `no.top`, …) against the
//!   alias and action tables, injects the persisted current namespace, and
//!   hands the long-form invocation to kubectl.
//! - `kurz-logs` — establishes a temporary port-forward tunnel to the log
//!   store, waits until it is live, then delegates a query to logcli with
//!   guaranteed tunnel teardown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod list;

pub use cli::{Cli, LogsCli};
pub use list::Listing;
