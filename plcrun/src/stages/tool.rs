//! A stage that runs one external tool and checks what it left behind.

use super::Stage;
use crate::context::StageContext;
use crate::core::{ArtifactKind, StageArtifact, StageKind, StageOutput};
use crate::errors::HarnessError;
use crate::toolchain::{Invocation, ProcessExit};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Runs the tool for one [`StageKind`].
///
/// The stage succeeds only if the tool exits with status zero and, for
/// generate and compile, its artifact is present afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ToolStage {
    kind: StageKind,
}

impl ToolStage {
    /// Creates a stage of the given kind.
    #[must_use]
    pub const fn new(kind: StageKind) -> Self {
        Self { kind }
    }

    /// Builds the invocation for this stage.
    #[must_use]
    pub fn invocation(&self, ctx: &StageContext<'_>) -> Invocation {
        let config = ctx.config;
        match self.kind {
            StageKind::Generate => {
                let mut inv = Invocation::new(self.kind, &config.runtime, ctx.work_dir());
                if ctx.workspace.is_scoped() {
                    // The harness classes stay in the launch directory.
                    inv = inv
                        .arg(&config.classpath_flag)
                        .arg(ctx.harness_dir.as_os_str());
                }
                inv.arg(&config.harness_entry).arg(ctx.source.as_os_str())
            }
            StageKind::Compile => Invocation::new(self.kind, &config.compiler, ctx.work_dir())
                .arg(&config.generated_file),
            StageKind::Execute => Invocation::new(self.kind, &config.runtime, ctx.work_dir())
                .arg(&config.program_name),
        }
    }

    /// Returns the artifact this stage is expected to produce.
    #[must_use]
    pub fn expected_artifact(&self, ctx: &StageContext<'_>) -> Option<StageArtifact> {
        match self.kind {
            StageKind::Generate => Some(
                ctx.workspace
                    .artifact(ArtifactKind::Generated, &ctx.config.generated_file),
            ),
            StageKind::Compile => Some(
                ctx.workspace
                    .artifact(ArtifactKind::Compiled, &ctx.config.compiled_file),
            ),
            StageKind::Execute => None,
        }
    }
}

#[async_trait]
impl Stage for ToolStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, HarnessError> {
        let started_at = Utc::now();
        let artifact = self.expected_artifact(ctx);

        if let Some(artifact) = &artifact {
            if !ctx.workspace.is_scoped() && ctx.workspace.clear_stale(artifact)? {
                info!(stage = %self.kind, file = %artifact.name, "Cleared artifact left by a previous run");
            }
        }

        let invocation = self.invocation(ctx);
        info!(stage = %self.kind, command = %invocation.command_line(), "Running tool");
        let exit = ctx.toolchain.run(&invocation, ctx.token).await?;

        let output = match exit {
            ProcessExit::Interrupted => {
                let reason = ctx.token.reason().unwrap_or_else(|| "interrupted".to_string());
                StageOutput::cancel(started_at, reason)
            }
            ProcessExit::Exited { code } if !exit.success() => {
                warn!(stage = %self.kind, exit_code = ?code, "Tool exited unsuccessfully");
                StageOutput::fail(
                    started_at,
                    code,
                    HarnessError::tool_failed(self.kind, &invocation.program, code).to_string(),
                )
            }
            ProcessExit::Exited { code } => match artifact {
                Some(artifact) if artifact.exists() => {
                    StageOutput::ok(started_at, code).with_artifact(artifact)
                }
                Some(artifact) => {
                    debug!(stage = %self.kind, path = %artifact.path.display(), "Artifact missing");
                    StageOutput::skip(started_at, code, format!("{} was not produced", artifact.name))
                }
                None => StageOutput::ok(started_at, code),
            },
        };

        info!(
            stage = %self.kind,
            status = %output.status,
            exit_code = ?output.exit_code,
            duration_ms = output.duration_ms(),
            "Stage finished"
        );
        Ok(output)
    }
}
