//! Environment-sourced configuration.
//!
//! Parsing is total: a missing or malformed variable falls back to its
//! default with a warning, never an error.

use std::path::PathBuf;

use tracing::warn;

/// Where the current namespace persists unless overridden.
pub const DEFAULT_STATE_PATH: &str = "/tmp/.k8s-cur-ns";

/// Default number of log lines returned when following without `--tail`.
pub const DEFAULT_TAIL: u32 = 20;

/// Default remote user for node login shortcuts.
pub const DEFAULT_SSH_USER: &str = "ubuntu";

/// Runtime configuration for the shorthand dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the persisted current-namespace file (`KURZ_STATE_PATH`).
    pub state_path: PathBuf,
    /// Whether extra-short resource aliases are addressable (`KURZ_SHORT_ALIASES`).
    pub allow_short_aliases: bool,
    /// Tail count injected when following logs without `--tail` (`KURZ_TAIL`).
    pub default_tail: u32,
    /// Remote user for the node ssh shortcut (`KURZ_SSH_USER`).
    pub ssh_user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            allow_short_aliases: true,
            default_tail: DEFAULT_TAIL,
            ssh_user: DEFAULT_SSH_USER.to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an injected variable lookup.
    ///
    /// Tests use this to avoid mutating process-wide environment state.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let state_path = lookup("KURZ_STATE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.state_path, PathBuf::from);

        let allow_short_aliases = lookup("KURZ_SHORT_ALIASES").map_or(true, |v| {
            parse_bool(&v).unwrap_or_else(|| {
                warn!(value = %v, "unrecognized KURZ_SHORT_ALIASES value, keeping default");
                defaults.allow_short_aliases
            })
        });

        let default_tail = lookup("KURZ_TAIL").map_or(defaults.default_tail, |v| {
            v.trim().parse().unwrap_or_else(|_| {
                warn!(value = %v, "unrecognized KURZ_TAIL value, keeping default");
                DEFAULT_TAIL
            })
        });

        let ssh_user = lookup("KURZ_SSH_USER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.ssh_user);

        Self {
            state_path,
            allow_short_aliases,
            default_tail,
            ssh_user,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
