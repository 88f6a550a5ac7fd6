//! `kurz-logs` binary entrypoint.
//!
//! Establishes a `kubectl port-forward` tunnel to the log store on a
//! random local port, polls until the port is live, then runs logcli
//! against the local endpoint. The tunnel process is torn down on every
//! exit path, including interrupts.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kurz_cli::cli::LogsCli;
use kurz_core::{FileStore, Invocation, NamespaceStore};
use kurz_tunnel::{ephemeral_port, run_with_tunnel, RetryPolicy};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = LogsCli::parse();
    let config = kurz_core::Config::from_env();
    let store = FileStore::new(config.state_path);
    let namespace = store.resolve(cli.namespace.as_deref());

    let local_port = ephemeral_port();
    let mut tunnel = Invocation::default();
    tunnel
        .arg("port-forward")
        .arg(&cli.target)
        .arg(format!("{local_port}:{}", cli.remote_port))
        .arg("-n")
        .arg(namespace);

    let mut delegate = Invocation::new("logcli");
    delegate.arg(format!("--addr=http://127.0.0.1:{local_port}"));
    delegate.args(cli.query.iter().cloned());

    let policy = RetryPolicy::with_attempts(cli.attempts);
    match run_with_tunnel(&tunnel, local_port, &policy, &delegate).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
