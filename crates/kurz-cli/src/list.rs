//! Alias and action listings.
//!
//! Supports a human-readable text table and JSON for scripting.

use std::io::Write;

use serde::Serialize;

use kurz_core::{Dispatcher, Scope};

/// Everything the active tables can resolve.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// Addressable resource aliases.
    pub aliases: Vec<AliasRow>,
    /// Registered actions.
    pub actions: Vec<ActionRow>,
}

/// One addressable alias.
#[derive(Debug, Clone, Serialize)]
pub struct AliasRow {
    /// The token a user types.
    pub token: String,
    /// The canonical resource it expands to.
    pub canonical: String,
    /// Whether the resource is cluster-scoped.
    pub cluster_scoped: bool,
}

/// One registered action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    /// Resource the action applies to (`*` for any, `-` for standalone).
    pub resource: String,
    /// The action suffix, or the full token for standalone actions.
    pub action: String,
    /// What the action does.
    pub description: String,
    /// Whether the action removes or rewrites cluster state.
    pub destructive: bool,
}

impl Listing {
    /// Collects the dispatcher's active tables, sorted for stable output.
    #[must_use]
    pub fn collect(dispatcher: &Dispatcher) -> Self {
        let mut aliases: Vec<AliasRow> = dispatcher
            .aliases()
            .entries()
            .map(|e| AliasRow {
                token: e.short.to_string(),
                canonical: e.canonical.to_string(),
                cluster_scoped: e.cluster_scoped,
            })
            .collect();
        aliases.sort_by(|a, b| a.token.cmp(&b.token));

        let mut actions: Vec<ActionRow> = dispatcher
            .registry()
            .iter()
            .map(|spec| ActionRow {
                resource: match spec.scope {
                    Scope::Resource(r) => r.to_string(),
                    Scope::Any => "*".to_string(),
                    Scope::Standalone => "-".to_string(),
                },
                action: spec.suffix.to_string(),
                description: spec.description.to_string(),
                destructive: spec.destructive,
            })
            .collect();
        actions.sort_by(|a, b| (&a.resource, &a.action).cmp(&(&b.resource, &b.action)));

        Self { aliases, actions }
    }

    /// Writes the listing as a text table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{:<14}  {:<26}  SCOPE", "ALIAS", "RESOURCE")?;
        writeln!(out, "{}", "─".repeat(52))?;
        for alias in &self.aliases {
            let scope = if alias.cluster_scoped {
                "cluster"
            } else {
                "namespaced"
            };
            writeln!(out, "{:<14}  {:<26}  {scope}", alias.token, alias.canonical)?;
        }

        writeln!(out)?;
        writeln!(out, "{:<14}  {:<10}  DESCRIPTION", "RESOURCE", "ACTION")?;
        writeln!(out, "{}", "─".repeat(72))?;
        for action in &self.actions {
            let marker = if action.destructive { " (destructive)" } else { "" };
            writeln!(
                out,
                "{:<14}  {:<10}  {}{marker}",
                action.resource, action.action, action.description
            )?;
        }
        Ok(())
    }
}
