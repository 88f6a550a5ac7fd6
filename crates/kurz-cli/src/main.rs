//! `kurz` binary entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kurz_cli::cli::Cli;
use kurz_cli::list::Listing;
use kurz_core::{Config, DispatchError, Dispatcher, FileStore, ProgramExecutor};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e}");
            // Resolution failures get a code distinct from kubectl's own 1.
            if e.is_resolution_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<i32, DispatchError> {
    let config = Config::from_env();
    debug!(?config, "loaded configuration");
    let dispatcher = Dispatcher::new(config.clone())?;
    let mut stdout = io::stdout().lock();

    if cli.list {
        let listing = Listing::collect(&dispatcher);
        if cli.json {
            serde_json::to_writer_pretty(&mut stdout, &listing)
                .map_err(|e| DispatchError::Io(io::Error::other(e)))?;
            writeln!(&mut stdout)?;
        } else {
            listing.write_text(&mut stdout)?;
        }
        return Ok(0);
    }

    let token = cli.token.unwrap_or_default();
    let store = FileStore::new(config.state_path);
    let executor = cli
        .kubectl_bin
        .map_or_else(ProgramExecutor::new, ProgramExecutor::with_program);

    dispatcher.execute(
        &store,
        &executor,
        &mut stdout,
        &token,
        &cli.args,
        cli.namespace.as_deref(),
    )
}
