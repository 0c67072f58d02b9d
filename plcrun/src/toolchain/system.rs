//! Toolchain backed by real processes.

use super::{Invocation, ProcessExit, Toolchain};
use crate::cancellation::CancellationToken;
use crate::errors::HarnessError;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// How long an unsuccessful exit waits for the interrupt listener.
///
/// Ctrl-C reaches the child and the harness at the same time, and the child's
/// exit can be observed before the harness has recorded the interrupt.
const SIGINT_GRACE: Duration = Duration::from_millis(250);

/// True if Ctrl-C arrived while the child was exiting.
async fn interrupted_during_exit(status: &ExitStatus, token: &CancellationToken) -> bool {
    if status.success() {
        return token.is_cancelled();
    }
    tokio::time::timeout(SIGINT_GRACE, token.cancelled())
        .await
        .is_ok()
}

/// Spawns tools as child processes with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolchain;

impl SystemToolchain {
    /// Creates a new system toolchain.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Toolchain for SystemToolchain {
    async fn run(
        &self,
        invocation: &Invocation,
        token: &CancellationToken,
    ) -> Result<ProcessExit, HarnessError> {
        if token.is_cancelled() {
            return Ok(ProcessExit::Interrupted);
        }

        debug!(
            stage = %invocation.stage,
            command = %invocation.command_line(),
            cwd = %invocation.cwd.display(),
            "Spawning tool"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::from_spawn(invocation.stage, &invocation.program, e))?;

        tokio::select! {
            biased;

            () = token.cancelled() => {
                if let Err(e) = child.kill().await {
                    warn!(stage = %invocation.stage, error = %e, "Failed to stop interrupted tool");
                }
                Ok(ProcessExit::Interrupted)
            }
            status = child.wait() => {
                let status = status?;
                if interrupted_during_exit(&status, token).await {
                    Ok(ProcessExit::Interrupted)
                } else {
                    Ok(ProcessExit::Exited { code: status.code() })
                }
            }
        }
    }
}
