//! Tunnel child-process session.
//!
//! A session owns the tunnel process for its whole lifetime: spawned with
//! a chosen local port, polled until a TCP connect against that port
//! succeeds, and torn down exactly once on every exit path. Teardown is
//! idempotent, and `kill_on_drop` backstops paths that never reach it.

use std::net::{Ipv4Addr, SocketAddr};
use std::process::Stdio;
use std::time::Duration;

use rand::Rng;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use kurz_core::Invocation;

use crate::error::{Result, TunnelError};

/// Local port range for tunnels, clear of the well-known ranges.
pub const PORT_RANGE: std::ops::RangeInclusive<u16> = 30000..=31767;

/// Picks a random local port from [`PORT_RANGE`].
#[must_use]
pub fn ephemeral_port() -> u16 {
    rand::thread_rng().gen_range(PORT_RANGE)
}

/// How readiness polling retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between connection attempts.
    pub interval: Duration,
    /// Per-attempt connect timeout.
    pub connect_timeout: Duration,
    /// Attempt bound; `None` polls until success or interruption.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(3),
            max_attempts: Some(60),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from a configured attempt count, where zero means
    /// unbounded polling.
    #[must_use]
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: (attempts > 0).then_some(attempts),
            ..Self::default()
        }
    }
}

/// A spawned tunnel process and its local endpoint.
#[derive(Debug)]
pub struct TunnelSession {
    local_port: u16,
    child: Option<Child>,
    ready: bool,
}

impl TunnelSession {
    /// Spawns the tunnel-establishing invocation as a child process.
    ///
    /// The child's stdio is detached; the tunnel speaks TCP, not the
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TunnelError::Spawn`] when the process cannot be started.
    pub fn spawn(invocation: &Invocation, local_port: u16) -> Result<Self> {
        let child = Command::new(invocation.program())
            .args(invocation.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TunnelError::spawn(invocation.to_string(), e))?;
        info!(port = local_port, command = %invocation, "tunnel process started");
        Ok(Self {
            local_port,
            child: Some(child),
            ready: false,
        })
    }

    /// The chosen local port.
    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Whether a readiness probe has succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Polls the local port until a TCP connect succeeds.
    ///
    /// Refused or timed-out attempts mean not-ready-yet and are retried at
    /// the policy interval; any other socket error is fatal. The wait is
    /// cancellable: dropping the future leaves the session intact for
    /// teardown.
    ///
    /// # Errors
    ///
    /// Returns [`TunnelError::Exited`] when the child dies first,
    /// [`TunnelError::Timeout`] when a bounded policy runs out of attempts,
    /// or [`TunnelError::Probe`] on a fatal socket error.
    pub async fn wait_ready(&mut self, policy: &RetryPolicy) -> Result<()> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.local_port));
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match timeout(policy.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => {
                    self.ready = true;
                    info!(port = self.local_port, attempts, "tunnel ready");
                    return Ok(());
                }
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                    debug!(port = self.local_port, attempts, "tunnel not ready yet");
                }
                Ok(Err(e)) => {
                    return Err(TunnelError::Probe {
                        port: self.local_port,
                        source: e,
                    });
                }
                Err(_elapsed) => {
                    debug!(port = self.local_port, attempts, "readiness probe timed out");
                }
            }

            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(TunnelError::Exited {
                        port: self.local_port,
                        code: status.code().unwrap_or(-1),
                    });
                }
            }

            if let Some(max) = policy.max_attempts {
                if attempts >= max {
                    return Err(TunnelError::Timeout {
                        port: self.local_port,
                        attempts,
                    });
                }
            }

            sleep(policy.interval).await;
        }
    }

    /// Terminates the tunnel process.
    ///
    /// Idempotent: the first call kills and reaps the child, later calls
    /// are no-ops. Never fails; a child that is already gone is the
    /// desired state.
    pub async fn teardown(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!(port = self.local_port, error = %e, "tunnel process already gone");
            }
            let _ = child.wait().await;
            info!(port = self.local_port, "tunnel torn down");
        }
    }

    /// Whether teardown has already run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.child.is_none()
    }
}
