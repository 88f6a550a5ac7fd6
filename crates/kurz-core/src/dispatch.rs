//! Shorthand dispatch: resolve a dot-delimited token and its residual
//! arguments into a fully formed invocation.
//!
//! Resolution order: the `use` built-in, standalone actions by full token,
//! then resource alias + action suffix with wildcard fallback, then the
//! bare pass-through form for kubectl's own verbs. Every failure is
//! reported before anything is executed.

use std::collections::HashSet;
use std::io::Write;

use once_cell::sync::Lazy;
use tracing::debug;
use uuid::Uuid;

use crate::actions::{ActionRegistry, ActionSpec, ArgShape, Scope};
use crate::alias::{AliasEntry, AliasTable};
use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::invocation::{Executor, Invocation};
use crate::namespace::NamespaceStore;

/// Image used by the disposable-pod helper when none is requested.
const DEFAULT_RUN_IMAGE: &str = "alpine";

/// Long-form flags the drain shortcut `-C`/`--complete` expands to.
const COMPLETE_DRAIN_FLAGS: &[&str] = &["--force", "--ignore-daemonsets", "--delete-emptydir-data"];

/// kubectl verbs accepted in the bare pass-through form.
static PASS_THROUGH_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "annotate",
        "api-resources",
        "api-versions",
        "apply",
        "attach",
        "auth",
        "autoscale",
        "certificate",
        "cluster-info",
        "config",
        "cordon",
        "cp",
        "create",
        "debug",
        "delete",
        "describe",
        "diff",
        "drain",
        "edit",
        "events",
        "exec",
        "explain",
        "expose",
        "get",
        "label",
        "logs",
        "patch",
        "port-forward",
        "proxy",
        "replace",
        "rollout",
        "scale",
        "set",
        "taint",
        "top",
        "uncordon",
        "version",
        "wait",
    ]
    .into_iter()
    .collect()
});

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A fully formed invocation for the execution boundary.
    Invoke(Invocation),
    /// The token was handled internally; the message goes to the user.
    Notice(String),
}

/// Residual arguments after the namespace flag has been extracted.
struct Residual {
    args: Vec<String>,
    namespace: Option<String>,
    all_namespaces: bool,
}

/// The shorthand dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    aliases: AliasTable,
    registry: ActionRegistry,
    config: Config,
}

impl Dispatcher {
    /// Builds a dispatcher over the built-in tables.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateEntry`] if the tables are
    /// internally inconsistent.
    pub fn new(config: Config) -> Result<Self> {
        let aliases = AliasTable::builtin(config.allow_short_aliases)?;
        let registry = ActionRegistry::builtin()?;
        registry.validate_against(&aliases)?;
        Ok(Self {
            aliases,
            registry,
            config,
        })
    }

    /// The active alias table.
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The active action registry.
    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Resolves a token and residual arguments into an [`Outcome`].
    ///
    /// `cli_namespace` is an explicit per-invocation override supplied ahead
    /// of the token; a `-n`/`--namespace` flag inside `args` wins over it.
    /// Neither is ever persisted.
    ///
    /// # Errors
    ///
    /// Returns a resolution error (unknown resource/action, argument
    /// mismatch) or [`DispatchError::NamespaceIo`] from the `use` action.
    /// No invocation is constructed when any step fails.
    pub fn dispatch(
        &self,
        store: &dyn NamespaceStore,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Outcome> {
        if token == "use" {
            return self.handle_use(store, args);
        }

        if let Some(spec) = self.registry.lookup_standalone(token) {
            let spec = *spec;
            return self.build_action(store, None, &spec, token, args, cli_namespace);
        }

        let (head, suffix) = token.split_once('.').unwrap_or((token, ""));
        match self.aliases.expand(head) {
            Ok(alias) => {
                let alias = alias.clone();
                let spec = *self
                    .registry
                    .lookup(alias.canonical, suffix)
                    .ok_or_else(|| DispatchError::unknown_action(alias.canonical, suffix))?;
                self.build_action(store, Some(&alias), &spec, token, args, cli_namespace)
            }
            Err(err) => {
                if suffix.is_empty() && PASS_THROUGH_VERBS.contains(token) {
                    Ok(Outcome::Invoke(self.pass_through(
                        store,
                        token,
                        args,
                        cli_namespace,
                    )))
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Dispatches and hands the result to the execution boundary.
    ///
    /// Notices are written to `out`; invocations run through `executor` and
    /// their exit code is returned unchanged.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors; no external process runs on failure.
    pub fn execute<W: Write>(
        &self,
        store: &dyn NamespaceStore,
        executor: &dyn Executor,
        out: &mut W,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<i32> {
        match self.dispatch(store, token, args, cli_namespace)? {
            Outcome::Notice(message) => {
                writeln!(out, "{message}")?;
                Ok(0)
            }
            Outcome::Invoke(invocation) => Ok(executor.run(&invocation)?),
        }
    }

    fn handle_use(&self, store: &dyn NamespaceStore, args: &[String]) -> Result<Outcome> {
        match args {
            [] => Ok(Outcome::Notice(format!(
                "Current namespace: {}",
                store.read()
            ))),
            [namespace] => {
                store.write(namespace)?;
                Ok(Outcome::Notice(format!(
                    "Switched to namespace '{namespace}'."
                )))
            }
            more => Err(DispatchError::argument_mismatch(
                "use",
                format!("expected at most one namespace, got {}", more.len()),
            )),
        }
    }

    fn build_action(
        &self,
        store: &dyn NamespaceStore,
        alias: Option<&AliasEntry>,
        spec: &ActionSpec,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Outcome> {
        debug!(token, destructive = spec.destructive, "resolved action");
        match (spec.scope, spec.suffix) {
            (Scope::Resource("nodes"), "ssh") => return self.build_ssh(token, args),
            (Scope::Standalone, "ctx") => return build_ctx(token, args),
            (Scope::Standalone, "logs") => {
                return self.build_logs(store, token, args, cli_namespace);
            }
            (Scope::Standalone, "run") => {
                return self.build_run(store, token, args, cli_namespace);
            }
            _ => {}
        }

        let invocation = match spec.shape {
            ArgShape::NameFreeform => self.build_freeform(store, spec, token, args, cli_namespace),
            ArgShape::FlagBundle => build_flag_bundle(spec, token, args),
            ArgShape::KeyValue => self.build_key_value(store, spec, token, args, cli_namespace),
            ArgShape::None | ArgShape::OneName => {
                self.build_simple(store, alias, spec, token, args, cli_namespace)
            }
        }?;
        Ok(Outcome::Invoke(invocation))
    }

    /// Generic builder for the `None` and `OneName` shapes, in the fixed
    /// order: verb, resource, name, namespace flag, fixed flags, remainder.
    fn build_simple(
        &self,
        store: &dyn NamespaceStore,
        alias: Option<&AliasEntry>,
        spec: &ActionSpec,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Invocation> {
        let residual = extract_namespace(args);
        let (names, flags) = split_args(&residual.args);

        let mut invocation = Invocation::default();
        invocation.args(spec.verb.iter().copied());
        if spec.with_resource {
            if let Some(alias) = alias {
                invocation.arg(alias.canonical);
            }
        }

        match spec.shape {
            ArgShape::None => {
                if !names.is_empty() {
                    return Err(DispatchError::argument_mismatch(
                        token,
                        format!("unexpected argument(s): {}", names.join(", ")),
                    ));
                }
            }
            _ => match names.as_slice() {
                [] if spec.allows_all => {}
                [] => {
                    return Err(DispatchError::argument_mismatch(
                        token,
                        "expected a resource name",
                    ));
                }
                [name] => {
                    invocation.arg(self.strip_resource_prefix(name));
                }
                more => {
                    return Err(DispatchError::argument_mismatch(
                        token,
                        format!("expected one name, got {}: {}", more.len(), more.join(", ")),
                    ));
                }
            },
        }

        self.push_namespace(&mut invocation, store, alias, spec, &residual, cli_namespace);
        invocation.args(spec.extra.iter().copied());
        invocation.args(flags);
        Ok(invocation)
    }

    /// `name=replicas` pairs; every malformed entry is reported by name.
    fn build_key_value(
        &self,
        store: &dyn NamespaceStore,
        spec: &ActionSpec,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Invocation> {
        let residual = extract_namespace(args);
        let (pairs, flags) = split_args(&residual.args);

        if pairs.is_empty() {
            return Err(DispatchError::argument_mismatch(
                token,
                "expected at least one name=replicas pair",
            ));
        }

        let mut malformed = Vec::new();
        let mut targets = Vec::new();
        for pair in &pairs {
            match pair.split_once('=') {
                Some((name, count))
                    if !name.is_empty() && !count.is_empty() && !count.contains('=') =>
                {
                    targets.push((self.strip_resource_prefix(name), count));
                }
                _ => malformed.push(pair.as_str()),
            }
        }
        if !malformed.is_empty() {
            return Err(DispatchError::argument_mismatch(
                token,
                format!(
                    "malformed name=replicas entry(s): {}",
                    malformed.join(", ")
                ),
            ));
        }

        let count = targets[0].1;
        if targets.iter().any(|(_, c)| *c != count) {
            return Err(DispatchError::argument_mismatch(
                token,
                "targets disagree on replica count; scale them one call at a time",
            ));
        }

        let mut invocation = Invocation::default();
        invocation.args(spec.verb.iter().copied());
        for (name, _) in &targets {
            invocation.arg(name.clone());
        }
        self.push_namespace(&mut invocation, store, None, spec, &residual, cli_namespace);
        invocation.arg(format!("--replicas={count}"));
        invocation.args(flags);
        Ok(invocation)
    }

    /// A name plus a verbatim remainder. Flags ahead of the name pass
    /// through to the tool; everything after it is never parsed.
    fn build_freeform(
        &self,
        store: &dyn NamespaceStore,
        spec: &ActionSpec,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Invocation> {
        let mut lead_flags: Vec<String> = Vec::new();
        let mut name = None;
        let mut remainder: Vec<String> = Vec::new();
        let mut namespace = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if name.is_some() {
                remainder.push(arg.clone());
            } else if arg == "-n" || arg == "--namespace" {
                namespace = iter.next().cloned();
            } else if let Some(value) = arg.strip_prefix("--namespace=") {
                namespace = Some(value.to_string());
            } else if arg.starts_with('-') {
                lead_flags.push(arg.clone());
            } else {
                name = Some(self.strip_resource_prefix(arg));
            }
        }

        let name = name.ok_or_else(|| {
            DispatchError::argument_mismatch(token, "expected a pod name before the command")
        })?;

        let explicit = namespace.as_deref().or(cli_namespace);
        let mut invocation = Invocation::default();
        invocation.args(spec.verb.iter().copied());
        invocation.args(["-i", "-t"]);
        invocation.arg(name);
        invocation.arg("-n").arg(store.resolve(explicit));
        invocation.args(lead_flags);
        invocation.arg("--");
        if remainder.is_empty() {
            invocation.arg("bash");
        } else {
            invocation.args(remainder);
        }
        Ok(invocation)
    }

    fn build_logs(
        &self,
        store: &dyn NamespaceStore,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Outcome> {
        let residual = extract_namespace(args);
        let (names, flags) = split_args(&residual.args);
        if names.len() > 2 {
            return Err(DispatchError::argument_mismatch(
                token,
                format!(
                    "expected a pod and optional container, got: {}",
                    names.join(", ")
                ),
            ));
        }

        let follow = flags.iter().any(|f| *f == "-f" || *f == "--follow");
        let has_tail = flags
            .iter()
            .any(|f| *f == "--tail" || f.starts_with("--tail="));
        let has_container = flags
            .iter()
            .any(|f| *f == "-c" || *f == "--container" || f.starts_with("--container="));

        let mut invocation = Invocation::default();
        invocation.arg("logs");
        if let Some(pod) = names.first() {
            invocation.arg(self.strip_resource_prefix(pod));
        }
        let explicit = residual.namespace.as_deref().or(cli_namespace);
        if !residual.all_namespaces {
            invocation.arg("-n").arg(store.resolve(explicit));
        }
        if let Some(container) = names.get(1) {
            invocation.arg("--container").arg(container);
        } else if !names.is_empty() && !has_container {
            // All containers unless one was singled out.
            invocation.arg("--all-containers");
        }
        if follow && !has_tail {
            invocation
                .arg("--tail")
                .arg(self.config.default_tail.to_string());
        }
        invocation.args(flags);
        Ok(Outcome::Invoke(invocation))
    }

    fn build_run(
        &self,
        store: &dyn NamespaceStore,
        token: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Result<Outcome> {
        let residual = extract_namespace(args);
        let (names, flags) = split_args(&residual.args);
        if !names.is_empty() {
            return Err(DispatchError::argument_mismatch(
                token,
                format!("unexpected argument(s): {}", names.join(", ")),
            ));
        }

        let has_image = flags
            .iter()
            .any(|f| *f == "--image" || f.starts_with("--image="));

        let mut invocation = Invocation::default();
        invocation.arg("run");
        invocation.arg(disposable_pod_name());
        let explicit = residual.namespace.as_deref().or(cli_namespace);
        invocation.arg("-n").arg(store.resolve(explicit));
        invocation.args(["--rm", "-i", "-t"]);
        if !has_image {
            invocation.args(["--image", DEFAULT_RUN_IMAGE]);
        }
        invocation.args(flags);
        Ok(Outcome::Invoke(invocation))
    }

    fn build_ssh(&self, token: &str, args: &[String]) -> Result<Outcome> {
        let (names, flags) = split_args(args);
        let [host] = names.as_slice() else {
            return Err(DispatchError::argument_mismatch(
                token,
                "expected exactly one node address",
            ));
        };

        let mut invocation = Invocation::new("ssh");
        invocation.args([
            "-o",
            "UserKnownHostsFile=/dev/null",
            "-o",
            "StrictHostKeyChecking=no",
        ]);
        invocation.arg(format!("{}@{host}", self.config.ssh_user));
        invocation.args(flags);
        Ok(Outcome::Invoke(invocation))
    }

    /// Identity form: forward kubectl's own verb verbatim, only injecting
    /// the current namespace when none was supplied.
    fn pass_through(
        &self,
        store: &dyn NamespaceStore,
        verb: &str,
        args: &[String],
        cli_namespace: Option<&str>,
    ) -> Invocation {
        let mut invocation = Invocation::default();
        invocation.arg(verb);
        invocation.args(args.iter().cloned());

        let has_namespace = args.iter().any(|a| {
            a == "-n"
                || a == "--namespace"
                || a.starts_with("--namespace=")
                || a == "-A"
                || a == "--all-namespaces"
        });
        if !has_namespace {
            invocation.arg("-n").arg(store.resolve(cli_namespace));
        }
        invocation
    }

    fn push_namespace(
        &self,
        invocation: &mut Invocation,
        store: &dyn NamespaceStore,
        alias: Option<&AliasEntry>,
        spec: &ActionSpec,
        residual: &Residual,
        cli_namespace: Option<&str>,
    ) {
        let cluster_scoped = alias.is_some_and(|a| a.cluster_scoped);
        if !spec.needs_namespace || cluster_scoped || residual.all_namespaces {
            return;
        }
        let explicit = residual.namespace.as_deref().or(cli_namespace);
        invocation.arg("-n").arg(store.resolve(explicit));
    }

    /// Reduces `resource/name` to `name` when the prefix is a known resource.
    fn strip_resource_prefix(&self, name: &str) -> String {
        if let Some((prefix, rest)) = name.split_once('/') {
            if !rest.is_empty() && self.aliases.is_known_resource(prefix) {
                return rest.to_string();
            }
        }
        name.to_string()
    }
}

fn build_ctx(token: &str, args: &[String]) -> Result<Outcome> {
    let (names, flags) = split_args(args);
    let mut invocation = Invocation::default();
    match names.as_slice() {
        [] => {
            invocation.args(["config", "get-contexts"]);
        }
        [context] => {
            invocation.args(["config", "use-context"]).arg(context);
        }
        more => {
            return Err(DispatchError::argument_mismatch(
                token,
                format!("expected one context name, got {}", more.len()),
            ));
        }
    }
    invocation.args(flags);
    Ok(Outcome::Invoke(invocation))
}

/// One node name; `-C`/`--complete` expands to the full drain flag set.
fn build_flag_bundle(spec: &ActionSpec, token: &str, args: &[String]) -> Result<Invocation> {
    let (names, raw_flags) = split_args(args);
    let [name] = names.as_slice() else {
        return Err(DispatchError::argument_mismatch(
            token,
            "expected exactly one node name",
        ));
    };

    let mut invocation = Invocation::default();
    invocation.args(spec.verb.iter().copied());
    invocation.arg(name.as_str());
    for flag in raw_flags {
        if flag == "-C" || flag == "--complete" {
            invocation.args(COMPLETE_DRAIN_FLAGS.iter().copied());
        } else {
            invocation.arg(flag);
        }
    }
    Ok(invocation)
}

/// Splits residual arguments into positionals and pass-through flags,
/// preserving the relative order of the flags.
fn split_args(args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut names = Vec::new();
    let mut flags = Vec::new();
    for arg in args {
        if arg.starts_with('-') {
            flags.push(arg.clone());
        } else {
            names.push(arg.clone());
        }
    }
    (names, flags)
}

/// Pulls an explicit namespace flag out of the residual arguments.
///
/// The extracted value becomes the per-invocation override; `-A` stays in
/// the argument list and additionally suppresses injection.
fn extract_namespace(args: &[String]) -> Residual {
    let mut rest = Vec::new();
    let mut namespace = None;
    let mut all_namespaces = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-n" || arg == "--namespace" {
            namespace = iter.next().cloned();
        } else if let Some(value) = arg.strip_prefix("--namespace=") {
            namespace = Some(value.to_string());
        } else if arg == "-A" || arg == "--all-namespaces" {
            all_namespaces = true;
            rest.push(arg.clone());
        } else {
            rest.push(arg.clone());
        }
    }
    Residual {
        args: rest,
        namespace,
        all_namespaces,
    }
}

fn disposable_pod_name() -> String {
    let ident = Uuid::new_v4().simple().to_string();
    format!("kurz-{}", &ident[..5])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::SpyExecutor;
    use crate::namespace::MemoryStore;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Config::default()).expect("dispatcher")
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn argv_of(outcome: Outcome) -> Vec<String> {
        match outcome {
            Outcome::Invoke(inv) => inv.argv().to_vec(),
            Outcome::Notice(msg) => panic!("expected an invocation, got notice: {msg}"),
        }
    }

    #[test]
    fn default_action_lists_with_persisted_namespace() {
        let store = MemoryStore::with_namespace("kube-system");
        let out = dispatcher()
            .dispatch(&store, "po", &[], None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-n", "kube-system"]);
    }

    #[test]
    fn delete_carries_name_and_current_namespace() {
        let store = MemoryStore::with_namespace("staging");
        let out = dispatcher()
            .dispatch(&store, "po.del", &args(&["mypod"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["delete", "pods", "mypod", "-n", "staging"]);
    }

    #[test]
    fn delete_without_a_name_is_rejected() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "po.del", &[], None)
            .expect_err("must fail");
        assert!(matches!(err, DispatchError::ArgumentMismatch { .. }));
    }

    #[test]
    fn dispatch_is_referentially_stable() {
        let store = MemoryStore::with_namespace("a");
        let d = dispatcher();
        let first = argv_of(d.dispatch(&store, "d.yaml", &args(&["api"]), None).expect("first"));
        let second = argv_of(d.dispatch(&store, "d.yaml", &args(&["api"]), None).expect("second"));
        assert_eq!(first, second);
        assert_eq!(
            first,
            ["get", "deployments", "api", "-n", "a", "-o", "yaml"]
        );
    }

    #[test]
    fn unknown_resource_does_not_reach_the_executor() {
        let store = MemoryStore::new();
        let spy = SpyExecutor::new();
        let mut out = Vec::new();
        let err = dispatcher()
            .execute(&store, &spy, &mut out, "zz.del", &args(&["x"]), None)
            .expect_err("must fail");
        assert!(matches!(err, DispatchError::UnknownResource { .. }));
        assert!(spy.calls().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_action_names_resource_and_suffix() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "po.frobnicate", &[], None)
            .expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "unknown action 'frobnicate' for resource 'pods'"
        );
    }

    #[test]
    fn override_wins_but_is_not_persisted() {
        let store = MemoryStore::with_namespace("persisted");
        let out = dispatcher()
            .dispatch(&store, "po", &[], Some("override"))
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-n", "override"]);
        assert_eq!(store.read(), "persisted");
    }

    #[test]
    fn namespace_flag_in_args_beats_the_cli_override() {
        let store = MemoryStore::with_namespace("persisted");
        let out = dispatcher()
            .dispatch(&store, "po", &args(&["-n", "from-args"]), Some("from-cli"))
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-n", "from-args"]);
    }

    #[test]
    fn all_namespaces_suppresses_injection() {
        let store = MemoryStore::with_namespace("persisted");
        let out = dispatcher()
            .dispatch(&store, "po", &args(&["-A"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-A"]);
    }

    #[test]
    fn cluster_scoped_resources_take_no_namespace() {
        let store = MemoryStore::with_namespace("persisted");
        let d = dispatcher();
        let nodes = argv_of(d.dispatch(&store, "no", &[], None).expect("nodes"));
        assert_eq!(nodes, ["get", "nodes"]);
        let namespaces = argv_of(d.dispatch(&store, "ns", &[], None).expect("namespaces"));
        assert_eq!(namespaces, ["get", "namespaces"]);
    }

    #[test]
    fn scale_builds_replica_flag() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "scale", &args(&["mydeployment=2"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["scale", "mydeployment", "-n", "default", "--replicas=2"]
        );
    }

    #[test]
    fn scale_reports_each_malformed_entry_by_name() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "scale", &args(&["a=1", "bad", "c=2=3"]), None)
            .expect_err("must fail");
        let message = err.to_string();
        assert!(message.contains("bad"));
        assert!(message.contains("c=2=3"));
        assert!(!message.contains("a=1,"));
    }

    #[test]
    fn scale_rejects_disagreeing_replica_counts() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "scale", &args(&["a=1", "b=2"]), None)
            .expect_err("must fail");
        assert!(err.to_string().contains("disagree"));
    }

    #[test]
    fn scale_accepts_agreeing_multi_targets() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "scale", &args(&["a=3", "b=3"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["scale", "a", "b", "-n", "default", "--replicas=3"]
        );
    }

    #[test]
    fn exec_defaults_to_bash() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "po.x", &args(&["mypod"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["exec", "-i", "-t", "mypod", "-n", "default", "--", "bash"]
        );
    }

    #[test]
    fn exec_forwards_the_remainder_verbatim() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(
                &store,
                "po.x",
                &args(&["mypod", "ls", "-la", "/tmp"]),
                None,
            )
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["exec", "-i", "-t", "mypod", "-n", "default", "--", "ls", "-la", "/tmp"]
        );
    }

    #[test]
    fn exec_without_a_pod_name_is_rejected() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "po.x", &[], None)
            .expect_err("must fail");
        assert!(err.to_string().contains("pod name"));
    }

    #[test]
    fn drain_expands_the_complete_bundle() {
        let store = MemoryStore::new();
        let out = dispatcher()
            .dispatch(&store, "no.drain", &args(&["node1", "-C"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            [
                "drain",
                "node1",
                "--force",
                "--ignore-daemonsets",
                "--delete-emptydir-data"
            ]
        );
    }

    #[test]
    fn drain_without_the_bundle_flag_passes_through() {
        let store = MemoryStore::new();
        let out = dispatcher()
            .dispatch(&store, "no.drain", &args(&["node1", "--dry-run=client"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["drain", "node1", "--dry-run=client"]);
    }

    #[test]
    fn events_are_sorted_and_reject_positionals() {
        let store = MemoryStore::with_namespace("default");
        let d = dispatcher();
        let out = d.dispatch(&store, "ev", &[], None).expect("dispatch");
        assert_eq!(
            argv_of(out),
            [
                "get",
                "events",
                "-n",
                "default",
                "--sort-by",
                ".metadata.creationTimestamp"
            ]
        );
        let err = d
            .dispatch(&store, "ev", &args(&["something"]), None)
            .expect_err("must fail");
        assert!(err.to_string().contains("something"));
    }

    #[test]
    fn logs_injects_tail_when_following() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "logs", &args(&["mypod", "-f"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            [
                "logs",
                "mypod",
                "-n",
                "default",
                "--all-containers",
                "--tail",
                "20",
                "-f"
            ]
        );
    }

    #[test]
    fn logs_second_positional_selects_the_container() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "logs", &args(&["mypod", "sidecar"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["logs", "mypod", "-n", "default", "--container", "sidecar"]
        );
    }

    #[test]
    fn logs_respects_an_explicit_tail() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "logs", &args(&["mypod", "-f", "--tail=5"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["logs", "mypod", "-n", "default", "--all-containers", "-f", "--tail=5"]
        );
    }

    #[test]
    fn run_builds_a_disposable_pod() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "run", &[], None)
            .expect("dispatch");
        let argv = argv_of(out);
        assert_eq!(argv[0], "run");
        assert!(argv[1].starts_with("kurz-"));
        assert_eq!(
            argv[2..],
            ["-n", "default", "--rm", "-i", "-t", "--image", "alpine"]
        );
    }

    #[test]
    fn run_keeps_an_explicit_image() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "run", &args(&["--image=busybox"]), None)
            .expect("dispatch");
        let argv = argv_of(out);
        assert!(!argv.contains(&"alpine".to_string()));
        assert!(argv.contains(&"--image=busybox".to_string()));
    }

    #[test]
    fn apply_file_requires_a_path_and_no_namespace() {
        let store = MemoryStore::with_namespace("persisted");
        let d = dispatcher();
        let out = d
            .dispatch(&store, "apply.f", &args(&["deploy.yaml"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["apply", "-f", "deploy.yaml"]);
        assert!(d.dispatch(&store, "apply.f", &[], None).is_err());
    }

    #[test]
    fn ctx_switches_or_lists_contexts() {
        let store = MemoryStore::new();
        let d = dispatcher();
        let bare = argv_of(d.dispatch(&store, "ctx", &[], None).expect("bare"));
        assert_eq!(bare, ["config", "get-contexts"]);
        let named = argv_of(
            d.dispatch(&store, "ctx", &args(&["prod"]), None)
                .expect("named"),
        );
        assert_eq!(named, ["config", "use-context", "prod"]);
    }

    #[test]
    fn node_ssh_targets_the_configured_user() {
        let store = MemoryStore::new();
        let d = dispatcher();
        let out = d
            .dispatch(&store, "no.ssh", &args(&["10.0.0.5"]), None)
            .expect("dispatch");
        match out {
            Outcome::Invoke(inv) => {
                assert_eq!(inv.program(), "ssh");
                assert!(inv.argv().contains(&"ubuntu@10.0.0.5".to_string()));
            }
            Outcome::Notice(_) => panic!("expected an invocation"),
        }
    }

    #[test]
    fn use_reports_the_current_namespace() {
        let store = MemoryStore::with_namespace("team-a");
        let out = dispatcher()
            .dispatch(&store, "use", &[], None)
            .expect("dispatch");
        assert_eq!(
            out,
            Outcome::Notice("Current namespace: team-a".to_string())
        );
    }

    #[test]
    fn use_persists_the_new_namespace() {
        let store = MemoryStore::new();
        let out = dispatcher()
            .dispatch(&store, "use", &args(&["team-b"]), None)
            .expect("dispatch");
        assert_eq!(
            out,
            Outcome::Notice("Switched to namespace 'team-b'.".to_string())
        );
        assert_eq!(store.read(), "team-b");
    }

    #[test]
    fn bare_pass_through_injects_the_namespace() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "get", &args(&["pods", "-owide"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-owide", "-n", "default"]);
    }

    #[test]
    fn bare_pass_through_respects_an_explicit_namespace() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "get", &args(&["pods", "-n", "other"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["get", "pods", "-n", "other"]);
    }

    #[test]
    fn unknown_token_with_suffix_is_not_pass_through() {
        let store = MemoryStore::new();
        let err = dispatcher()
            .dispatch(&store, "zz.w", &[], None)
            .expect_err("must fail");
        assert_eq!(err.to_string(), "unknown resource 'zz'");
    }

    #[test]
    fn resource_prefix_is_stripped_from_names() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "po.del", &args(&["pod/mypod"]), None)
            .expect("dispatch");
        assert_eq!(argv_of(out), ["delete", "pods", "mypod", "-n", "default"]);
    }

    #[test]
    fn unknown_prefix_is_left_alone() {
        let store = MemoryStore::with_namespace("default");
        let out = dispatcher()
            .dispatch(&store, "po.del", &args(&["weird/mypod"]), None)
            .expect("dispatch");
        assert_eq!(
            argv_of(out),
            ["delete", "pods", "weird/mypod", "-n", "default"]
        );
    }

    #[test]
    fn execute_returns_the_delegated_exit_code() {
        let store = MemoryStore::new();
        let spy = SpyExecutor::with_exit_code(42);
        let mut out = Vec::new();
        let code = dispatcher()
            .execute(&store, &spy, &mut out, "po", &[], None)
            .expect("execute");
        assert_eq!(code, 42);
        assert_eq!(spy.calls().len(), 1);
    }

    #[test]
    fn execute_writes_notices_to_the_writer() {
        let store = MemoryStore::new();
        let spy = SpyExecutor::new();
        let mut out = Vec::new();
        let code = dispatcher()
            .execute(&store, &spy, &mut out, "use", &[], None)
            .expect("execute");
        assert_eq!(code, 0);
        assert!(spy.calls().is_empty());
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "Current namespace: default\n");
    }

    #[test]
    fn short_alias_switch_prunes_extra_short_tokens() {
        let config = Config {
            allow_short_aliases: false,
            ..Config::default()
        };
        let d = Dispatcher::new(config).expect("dispatcher");
        let store = MemoryStore::new();
        assert!(d.dispatch(&store, "d", &[], None).is_err());
        let out = d
            .dispatch(&store, "deploy", &[], None)
            .expect("deploy still resolves");
        assert_eq!(argv_of(out), ["get", "deployments", "-n", "default"]);
    }
}
