//! # kurz-tunnel
//!
//! Child-process lifecycle for the log-query tunnel wrapper: spawn a
//! tunnel-establishing invocation, poll its local TCP endpoint until it is
//! live, run a delegated foreground invocation against it, and guarantee
//! teardown of the tunnel process on every exit path — success, error, or
//! interrupt.
//!
//! The state flow is `spawn → poll → ready → delegate → torn down`, with
//! an interrupt reachable from any non-terminal state. Acquisition and
//! release of the tunnel child are matched one to one: [`run_with_tunnel`]
//! tears the session down on its single exit, and `kill_on_drop` backstops
//! abnormal unwinds.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod session;

pub use error::{Result, TunnelError};
pub use session::{ephemeral_port, RetryPolicy, TunnelSession, PORT_RANGE};

use tokio::process::Command;
use tokio::signal;
use tracing::info;

use kurz_core::Invocation;

/// Exit code reported when the wrapper is interrupted, per shell convention.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Establishes the tunnel, waits for readiness, and runs `delegate` in the
/// foreground with inherited stdio.
///
/// Returns the delegated tool's exit code unchanged, or
/// [`INTERRUPT_EXIT_CODE`] when ctrl-c arrives during polling or
/// delegation. The tunnel process is torn down exactly once on every path
/// out of this function.
///
/// # Errors
///
/// Returns a [`TunnelError`] when the tunnel cannot be spawned, dies
/// early, exhausts a bounded readiness poll, or the delegate cannot be
/// started. A non-zero exit of the delegate itself is a code, not an
/// error.
pub async fn run_with_tunnel(
    tunnel: &Invocation,
    local_port: u16,
    policy: &RetryPolicy,
    delegate: &Invocation,
) -> Result<i32> {
    let mut session = TunnelSession::spawn(tunnel, local_port)?;
    let result = drive(&mut session, policy, delegate).await;
    session.teardown().await;
    result
}

async fn drive(
    session: &mut TunnelSession,
    policy: &RetryPolicy,
    delegate: &Invocation,
) -> Result<i32> {
    tokio::select! {
        ready = session.wait_ready(policy) => ready?,
        _ = signal::ctrl_c() => {
            info!("interrupted while waiting for the tunnel");
            return Ok(INTERRUPT_EXIT_CODE);
        }
    }

    let mut child = Command::new(delegate.program())
        .args(delegate.argv())
        .spawn()
        .map_err(|e| TunnelError::spawn(delegate.to_string(), e))?;

    tokio::select! {
        status = child.wait() => Ok(status?.code().unwrap_or(INTERRUPT_EXIT_CODE)),
        _ = signal::ctrl_c() => {
            info!("interrupted, stopping the delegated tool");
            let _ = child.start_kill();
            let _ = child.wait().await;
            Ok(INTERRUPT_EXIT_CODE)
        }
    }
}
