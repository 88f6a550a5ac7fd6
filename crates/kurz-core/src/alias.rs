//! Resource alias table.
//!
//! Maps short resource tokens to the canonical plural names kubectl
//! understands. Resolution is exact-match and case-sensitive; anything
//! else is surfaced as unknown rather than guessed.

use std::collections::HashMap;

use crate::error::{DispatchError, Result};

/// One alias in the base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// The short token this entry is addressed by.
    pub short: &'static str,
    /// The canonical plural resource name.
    pub canonical: &'static str,
    /// Extra-short form, only addressable when short aliases are enabled.
    pub short_form: bool,
    /// The resource is cluster-scoped and never takes a namespace flag.
    pub cluster_scoped: bool,
}

const fn entry(short: &'static str, canonical: &'static str) -> AliasEntry {
    AliasEntry {
        short,
        canonical,
        short_form: false,
        cluster_scoped: false,
    }
}

const fn short_entry(short: &'static str, canonical: &'static str) -> AliasEntry {
    AliasEntry {
        short,
        canonical,
        short_form: true,
        cluster_scoped: false,
    }
}

const fn cluster_entry(short: &'static str, canonical: &'static str) -> AliasEntry {
    AliasEntry {
        short,
        canonical,
        short_form: false,
        cluster_scoped: true,
    }
}

/// The fixed base table. Extra-short forms that kubectl itself would not
/// accept are marked `short_form` and pruned when the switch is off.
const BASE_TABLE: &[AliasEntry] = &[
    cluster_entry("ns", "namespaces"),
    entry("po", "pods"),
    entry("svc", "services"),
    entry("rs", "replicasets"),
    entry("rc", "replicationcontrollers"),
    entry("sts", "statefulsets"),
    entry("ds", "daemonsets"),
    entry("cj", "cronjobs"),
    entry("cm", "configmaps"),
    short_entry("j", "jobs"),
    entry("job", "jobs"),
    short_entry("d", "deployments"),
    entry("deploy", "deployments"),
    short_entry("sec", "secrets"),
    entry("secret", "secrets"),
    cluster_entry("no", "nodes"),
];

/// Alias table resolving short tokens (and canonical names) to resources.
#[derive(Debug)]
pub struct AliasTable {
    entries: HashMap<&'static str, AliasEntry>,
}

impl AliasTable {
    /// Builds the built-in table.
    ///
    /// Canonical long forms are always addressable by themselves; entries
    /// marked as extra-short are included only when `allow_short` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] if two entries share an
    /// addressable token.
    pub fn builtin(allow_short: bool) -> Result<Self> {
        let active = BASE_TABLE
            .iter()
            .filter(|e| allow_short || !e.short_form)
            .cloned();
        Self::from_entries(active)
    }

    /// Builds a table from explicit entries, failing fast on duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] on the first token that
    /// would shadow an earlier entry.
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Result<Self> {
        let mut map: HashMap<&'static str, AliasEntry> = HashMap::new();
        for e in entries {
            if map.contains_key(e.short) {
                return Err(DispatchError::duplicate_entry(e.short));
            }
            // The canonical long form stays addressable as itself.
            let canonical = AliasEntry {
                short: e.canonical,
                ..e.clone()
            };
            map.entry(e.canonical).or_insert(canonical);
            map.insert(e.short, e);
        }
        Ok(Self { entries: map })
    }

    /// Resolves a token to its alias entry, exact match only.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownResource`] when the token is not in
    /// the active table.
    pub fn expand(&self, token: &str) -> Result<&AliasEntry> {
        self.entries
            .get(token)
            .ok_or_else(|| DispatchError::unknown_resource(token))
    }

    /// Whether `name` is a known resource token or canonical name.
    ///
    /// Accepts a singular spelling of a canonical plural, which is how
    /// `resource/name` prefixes commonly appear in copied output.
    #[must_use]
    pub fn is_known_resource(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.entries.contains_key(lower.as_str())
            || self.entries.contains_key(format!("{lower}s").as_str())
    }

    /// Iterates over the addressable entries, for listings.
    pub fn entries(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.values()
    }
}
