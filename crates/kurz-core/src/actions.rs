//! Per-resource and standalone action registry.
//!
//! Actions are declared in one static table and validated at construction,
//! so duplicate or shadowing entries abort startup instead of surfacing as
//! dispatch-time surprises. Resource-specific entries always beat wildcard
//! entries with the same suffix.

use std::collections::HashMap;

use crate::alias::AliasTable;
use crate::error::{DispatchError, Result};

/// Shape of the residual arguments an action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// No positional arguments; recognized flags pass through.
    None,
    /// Exactly one resource name, unless the action allows an implicit-all target.
    OneName,
    /// A resource name followed by a verbatim remainder (never parsed).
    NameFreeform,
    /// Each positional must be a single `key=value` pair.
    KeyValue,
    /// One name plus a fixed set of short flags translated to long-form flags.
    FlagBundle,
}

/// Which resources an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Applies to one canonical resource.
    Resource(&'static str),
    /// Applies to any resource (resolved only if no specific entry matches).
    Any,
    /// Addressed by its full token, with no resource segment.
    Standalone,
}

/// Declarative description of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    /// Resource scope.
    pub scope: Scope,
    /// Action suffix (empty for the default action) or, for standalone
    /// actions, the full token.
    pub suffix: &'static str,
    /// Leading argv of the underlying invocation.
    pub verb: &'static [&'static str],
    /// Fixed flags appended after the namespace flag.
    pub extra: &'static [&'static str],
    /// Residual argument shape.
    pub shape: ArgShape,
    /// Whether the canonical resource name is inserted after the verb.
    pub with_resource: bool,
    /// Whether the effective namespace is injected.
    pub needs_namespace: bool,
    /// Whether the action removes or rewrites cluster state.
    pub destructive: bool,
    /// Whether a missing name means "all" instead of an error.
    pub allows_all: bool,
    /// One-line description for listings.
    pub description: &'static str,
}

impl ActionSpec {
    const fn new(
        scope: Scope,
        suffix: &'static str,
        verb: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            scope,
            suffix,
            verb,
            extra: &[],
            shape: ArgShape::OneName,
            with_resource: true,
            needs_namespace: true,
            destructive: false,
            allows_all: false,
            description,
        }
    }

    const fn extra(mut self, extra: &'static [&'static str]) -> Self {
        self.extra = extra;
        self
    }

    const fn shape(mut self, shape: ArgShape) -> Self {
        self.shape = shape;
        self
    }

    const fn no_resource(mut self) -> Self {
        self.with_resource = false;
        self
    }

    const fn no_namespace(mut self) -> Self {
        self.needs_namespace = false;
        self
    }

    const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    const fn allows_all(mut self) -> Self {
        self.allows_all = true;
        self
    }

    /// The token a user types for this action on a given resource token.
    #[must_use]
    pub fn token_for(&self, resource_token: &str) -> String {
        match self.scope {
            Scope::Standalone => self.suffix.to_string(),
            _ if self.suffix.is_empty() => resource_token.to_string(),
            _ => format!("{resource_token}.{}", self.suffix),
        }
    }
}

const fn any(
    suffix: &'static str,
    verb: &'static [&'static str],
    description: &'static str,
) -> ActionSpec {
    ActionSpec::new(Scope::Any, suffix, verb, description)
}

const fn on(
    resource: &'static str,
    suffix: &'static str,
    verb: &'static [&'static str],
    description: &'static str,
) -> ActionSpec {
    ActionSpec::new(Scope::Resource(resource), suffix, verb, description)
}

const fn standalone(
    token: &'static str,
    verb: &'static [&'static str],
    description: &'static str,
) -> ActionSpec {
    ActionSpec::new(Scope::Standalone, token, verb, description).no_resource()
}

/// The built-in action table.
const BUILTIN: &[ActionSpec] = &[
    // Common family, applicable to any resource.
    any("", &["get"], "list resources").allows_all(),
    any("w", &["get"], "list resources (wide)")
        .extra(&["-o", "wide"])
        .allows_all(),
    any("desc", &["describe"], "describe resources").allows_all(),
    any("del", &["delete"], "delete a resource").destructive(),
    any("ed", &["edit"], "edit a resource"),
    any("yaml", &["get"], "YAML representation of resources")
        .extra(&["-o", "yaml"])
        .allows_all(),
    any("json", &["get"], "JSON representation of resources")
        .extra(&["-o", "json"])
        .allows_all(),
    // Pod extras.
    on("pods", "x", &["exec"], "execute a command in a pod (bash by default)")
        .shape(ArgShape::NameFreeform)
        .no_resource(),
    on("pods", "top", &["top"], "resource usage of pods").allows_all(),
    // Node extras.
    on("nodes", "top", &["top"], "resource usage of nodes").allows_all(),
    on("nodes", "drain", &["drain"], "drain a node (-C for a complete drain)")
        .shape(ArgShape::FlagBundle)
        .no_resource()
        .destructive(),
    on("nodes", "ssh", &[], "log in to a node over ssh")
        .no_resource()
        .no_namespace(),
    // Standalone helpers.
    standalone("ev", &["get", "events"], "list events by creation time")
        .extra(&["--sort-by", ".metadata.creationTimestamp"])
        .shape(ArgShape::None),
    standalone("logs", &["logs"], "container logs (pod, then optional container)"),
    standalone("scale", &["scale"], "scale workloads via name=replicas pairs")
        .shape(ArgShape::KeyValue),
    standalone("run", &["run"], "run a disposable pod with a TTY attached")
        .shape(ArgShape::None),
    standalone("apply.f", &["apply", "-f"], "apply a manifest file or URL").no_namespace(),
    standalone("apply.k", &["apply", "-k"], "apply a kustomization directory").no_namespace(),
    standalone("del.f", &["delete", "-f"], "delete objects from a manifest file or URL")
        .no_namespace()
        .destructive(),
    standalone("ctx", &[], "switch kubeconfig context or list contexts").no_namespace(),
    standalone("use", &[], "set the working namespace or print the current one").no_namespace(),
];

/// Action registry with deterministic lookup.
#[derive(Debug)]
pub struct ActionRegistry {
    specific: HashMap<(&'static str, &'static str), ActionSpec>,
    wildcard: HashMap<&'static str, ActionSpec>,
    standalone: HashMap<&'static str, ActionSpec>,
}

impl ActionRegistry {
    /// Builds the built-in registry.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] if two entries collide
    /// within the same scope.
    pub fn builtin() -> Result<Self> {
        Self::from_specs(BUILTIN.iter().copied())
    }

    /// Builds a registry from explicit specs, failing fast on duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] on the first collision.
    pub fn from_specs(specs: impl IntoIterator<Item = ActionSpec>) -> Result<Self> {
        let mut registry = Self {
            specific: HashMap::new(),
            wildcard: HashMap::new(),
            standalone: HashMap::new(),
        };
        for spec in specs {
            match spec.scope {
                Scope::Resource(resource) => {
                    if registry
                        .specific
                        .insert((resource, spec.suffix), spec)
                        .is_some()
                    {
                        return Err(DispatchError::duplicate_entry(format!(
                            "{resource}.{}",
                            spec.suffix
                        )));
                    }
                }
                Scope::Any => {
                    if registry.wildcard.insert(spec.suffix, spec).is_some() {
                        return Err(DispatchError::duplicate_entry(format!(
                            "*.{}",
                            spec.suffix
                        )));
                    }
                }
                Scope::Standalone => {
                    if registry.standalone.insert(spec.suffix, spec).is_some() {
                        return Err(DispatchError::duplicate_entry(spec.suffix));
                    }
                }
            }
        }
        Ok(registry)
    }

    /// Looks up the action for a canonical resource and suffix.
    ///
    /// Resource-specific entries win over wildcard entries.
    #[must_use]
    pub fn lookup<'a>(&'a self, resource: &'a str, suffix: &'a str) -> Option<&'a ActionSpec> {
        self.specific
            .get(&(resource, suffix))
            .or_else(|| self.wildcard.get(suffix))
    }

    /// Looks up a standalone action by its full token.
    #[must_use]
    pub fn lookup_standalone(&self, token: &str) -> Option<&ActionSpec> {
        self.standalone.get(token)
    }

    /// Verifies that no standalone token shadows an alias token.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] on the first collision.
    pub fn validate_against(&self, aliases: &AliasTable) -> Result<()> {
        for token in self.standalone.keys() {
            if aliases.expand(token).is_ok() {
                return Err(DispatchError::duplicate_entry(*token));
            }
        }
        Ok(())
    }

    /// Iterates over every registered spec, for listings.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specific
            .values()
            .chain(self.wildcard.values())
            .chain(self.standalone.values())
    }
}
