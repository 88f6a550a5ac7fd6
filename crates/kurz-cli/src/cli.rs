//! Command-line argument parsing with clap.
//!
//! The shorthand token is deliberately an opaque positional rather than a
//! clap subcommand tree: the dispatcher owns token resolution, and
//! everything after the token is handed over untouched.

use clap::Parser;

/// Shorthand front-end for kubectl.
#[derive(Parser, Debug, Clone)]
#[command(name = "kurz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Namespace override for this invocation (never persisted).
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Alternate binary to hand cluster invocations to.
    #[arg(long, env = "KURZ_KUBECTL", value_name = "PROGRAM")]
    pub kubectl_bin: Option<String>,

    /// List every alias and action, then exit.
    #[arg(long)]
    pub list: bool,

    /// Emit the listing as JSON.
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Shorthand token (e.g. `po.del`, `no.top`) or a kubectl verb.
    #[arg(required_unless_present = "list")]
    pub token: Option<String>,

    /// Residual arguments handed to the resolved action.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Log-query wrapper: tunnel to the log store, then delegate to logcli.
#[derive(Parser, Debug, Clone)]
#[command(name = "kurz-logs")]
#[command(version, about, long_about = None)]
pub struct LogsCli {
    /// Port-forward target that establishes the tunnel.
    #[arg(long, env = "KURZ_TUNNEL_TARGET", default_value = "svc/loki")]
    pub target: String,

    /// Remote port the tunnel forwards to.
    #[arg(long, env = "KURZ_TUNNEL_REMOTE_PORT", default_value_t = 3100)]
    pub remote_port: u16,

    /// Readiness attempts before giving up; 0 polls until interrupted.
    #[arg(long, env = "KURZ_TUNNEL_ATTEMPTS", default_value_t = 60)]
    pub attempts: u32,

    /// Namespace of the tunnel target (current namespace by default).
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Arguments handed to logcli, e.g. `query '{app="api"}'`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub query: Vec<String>,
}
