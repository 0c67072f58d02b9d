//! The pipeline runner.
//!
//! Runs generate, compile and execute in order. A stage only runs if the
//! previous one exited with status zero and left its artifact behind.

use super::report::{PipelineOutcome, PipelineReport, StageRecord};
use crate::cancellation::CancellationToken;
use crate::config::HarnessConfig;
use crate::console::Console;
use crate::context::StageContext;
use crate::core::{StageKind, StageOutput, StageStatus};
use crate::errors::HarnessError;
use crate::events::{names, EventSink, NoOpEventSink};
use crate::stages::{default_stages, Stage};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;
use chrono::Utc;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Sequences the harness stages for one source file at a time.
pub struct Pipeline {
    config: HarnessConfig,
    launch_dir: PathBuf,
    toolchain: Arc<dyn Toolchain>,
    stages: Vec<Box<dyn Stage>>,
    console: Arc<Console>,
    events: Arc<dyn EventSink>,
    token: Arc<CancellationToken>,
}

impl Pipeline {
    /// Creates a pipeline.
    ///
    /// Relative source paths and the default harness directory are
    /// resolved against `launch_dir`.
    pub fn new(
        config: HarnessConfig,
        launch_dir: impl Into<PathBuf>,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        Self {
            config,
            launch_dir: launch_dir.into(),
            toolchain,
            stages: default_stages(),
            console: Arc::new(Console::stdout()),
            events: Arc::new(NoOpEventSink),
            token: Arc::new(CancellationToken::new()),
        }
    }

    /// Sets the console progress messages are written to.
    #[must_use]
    pub fn with_console(mut self, console: Arc<Console>) -> Self {
        self.console = console;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the token that interrupts the run.
    #[must_use]
    pub fn with_token(mut self, token: Arc<CancellationToken>) -> Self {
        self.token = token;
        self
    }

    /// Returns the interrupt token.
    #[must_use]
    pub fn token(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.token)
    }

    /// Runs all stages against `source`.
    ///
    /// Missing artifacts and interrupts end the run normally and are
    /// reported through [`PipelineOutcome`]. Errors are tool failures,
    /// missing tools, a missing source file or workspace problems.
    pub async fn run(&self, source: impl AsRef<Path>) -> Result<PipelineReport, HarnessError> {
        let source = source.as_ref();
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id, source = %source.display());

        async {
            self.events
                .emit(
                    names::PIPELINE_STARTED,
                    Some(json!({
                        "run_id": run_id.to_string(),
                        "source": source.display().to_string(),
                    })),
                )
                .await;

            let result = self.drive(run_id, source).await;

            match &result {
                Ok(report) => {
                    info!(
                        outcome = ?report.outcome,
                        duration_ms = report.duration_ms(),
                        "Pipeline finished"
                    );
                    let event = if matches!(report.outcome, PipelineOutcome::Interrupted { .. }) {
                        names::PIPELINE_INTERRUPTED
                    } else {
                        names::PIPELINE_COMPLETED
                    };
                    self.events
                        .emit(event, serde_json::to_value(&report.outcome).ok())
                        .await;
                }
                Err(err) => {
                    error!(error = %err, "Pipeline failed");
                    self.events
                        .emit(names::PIPELINE_FAILED, Some(err.to_json()))
                        .await;
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, run_id: Uuid, source: &Path) -> Result<PipelineReport, HarnessError> {
        let started_at = Utc::now();
        let resolved = self.resolve_source(source)?;

        self.console.banner(source)?;

        let workspace = Workspace::create(self.config.workspace, &self.launch_dir)?;
        let ctx = StageContext {
            config: &self.config,
            workspace: &workspace,
            // Tools run elsewhere in scoped mode, so they need the absolute path.
            source: if workspace.is_scoped() {
                resolved
            } else {
                source.to_path_buf()
            },
            harness_dir: self.harness_dir(),
            toolchain: self.toolchain.as_ref(),
            token: &self.token,
        };

        let mut records = Vec::with_capacity(self.stages.len());
        let mut outcome = None;

        for stage in &self.stages {
            let kind = stage.kind();
            if self.token.is_cancelled() {
                outcome = Some(PipelineOutcome::Interrupted { stage: kind });
                break;
            }

            self.events
                .emit(names::STAGE_STARTED, Some(json!({ "stage": kind })))
                .await;

            let result = stage.execute(&ctx).await;
            // Tools may answer Ctrl-C with an ordinary exit code.
            if self.token.is_cancelled() {
                let started_at = result.as_ref().map_or_else(|_| Utc::now(), |o| o.started_at);
                let reason = self.token.reason().unwrap_or_else(|| "interrupt".to_string());
                info!(stage = %kind, "Interrupted, skipping remaining stages");
                records.push(StageRecord {
                    stage: kind,
                    output: StageOutput::cancel(started_at, reason),
                });
                outcome = Some(PipelineOutcome::Interrupted { stage: kind });
                break;
            }

            let output = match result {
                Ok(output) => output,
                Err(err) => {
                    self.events
                        .emit(names::STAGE_FAILED, Some(err.to_json()))
                        .await;
                    return Err(err);
                }
            };
            let status = output.status;
            let exit_code = output.exit_code;
            let payload = json!({
                "stage": kind,
                "status": status,
                "exit_code": exit_code,
                "duration_ms": output.duration_ms(),
                "reason": output.reason(),
            });
            let reason = output.reason().map(str::to_string);
            records.push(StageRecord { stage: kind, output });

            match status {
                StageStatus::Ok => {
                    self.events.emit(names::STAGE_COMPLETED, Some(payload)).await;
                    match kind {
                        StageKind::Generate => self.console.generated(&self.config.generated_file)?,
                        StageKind::Compile => self.console.compiled(&self.config.program_name)?,
                        StageKind::Execute => {
                            outcome = Some(PipelineOutcome::Completed {
                                exit_code: exit_code.unwrap_or(0),
                            });
                        }
                    }
                }
                StageStatus::Skip => {
                    self.events.emit(names::STAGE_SKIPPED, Some(payload)).await;
                    info!(stage = %kind, "Artifact missing, skipping remaining stages");
                    outcome = Some(PipelineOutcome::Stopped {
                        stage: kind,
                        reason: reason.unwrap_or_default(),
                    });
                    break;
                }
                StageStatus::Cancel => {
                    outcome = Some(PipelineOutcome::Interrupted { stage: kind });
                    break;
                }
                StageStatus::Fail => {
                    self.events.emit(names::STAGE_FAILED, Some(payload)).await;
                    if kind == StageKind::Execute {
                        // The user's program failing is its result, not ours.
                        outcome = Some(PipelineOutcome::Completed {
                            exit_code: exit_code.filter(|c| *c != 0).unwrap_or(1),
                        });
                    } else {
                        return Err(HarnessError::tool_failed(kind, self.program_for(kind), exit_code));
                    }
                }
            }
        }

        let outcome = outcome.unwrap_or(PipelineOutcome::Completed { exit_code: 0 });
        if matches!(outcome, PipelineOutcome::Interrupted { .. }) {
            self.console.farewell()?;
        }
        self.console.finish()?;

        let report = PipelineReport {
            run_id,
            source: source.to_path_buf(),
            workspace: workspace.dir().to_path_buf(),
            scoped: workspace.is_scoped(),
            stages: records,
            outcome,
            started_at,
            ended_at: Utc::now(),
        };
        drop(workspace);
        Ok(report)
    }

    fn resolve_source(&self, source: &Path) -> Result<PathBuf, HarnessError> {
        let resolved = self.launch_dir.join(source);
        if resolved.is_file() {
            Ok(resolved)
        } else {
            Err(HarnessError::SourceNotFound {
                path: source.to_path_buf(),
            })
        }
    }

    fn harness_dir(&self) -> PathBuf {
        self.config
            .harness_dir
            .as_ref()
            .map_or_else(|| self.launch_dir.clone(), |dir| self.launch_dir.join(dir))
    }

    fn program_for(&self, kind: StageKind) -> &str {
        match kind {
            StageKind::Generate | StageKind::Execute => &self.config.runtime,
            StageKind::Compile => &self.config.compiler,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("launch_dir", &self.launch_dir)
            .field("stages", &self.stages)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceMode;
    use crate::testing::CollectingEventSink;
    use crate::testing::{ScriptedToolchain, SharedBuffer, ToolScript};
    use pretty_assertions::assert_eq;

    struct Fixture {
        launch: tempfile::TempDir,
        toolchain: Arc<ScriptedToolchain>,
        buffer: SharedBuffer,
        events: Arc<CollectingEventSink>,
    }

    impl Fixture {
        fn new(toolchain: ScriptedToolchain) -> Self {
            let launch = tempfile::tempdir().unwrap();
            std::fs::write(launch.path().join("source1.plc"), "LET x = 1;").unwrap();
            Self {
                launch,
                toolchain: Arc::new(toolchain),
                buffer: SharedBuffer::new(),
                events: Arc::new(CollectingEventSink::new()),
            }
        }

        fn pipeline(&self, config: HarnessConfig) -> Pipeline {
            Pipeline::new(config, self.launch.path(), self.toolchain.clone())
                .with_console(Arc::new(Console::with_writer(self.buffer.clone())))
                .with_event_sink(self.events.clone())
        }
    }

    #[tokio::test]
    async fn test_happy_path_runs_all_stages() {
        let fixture = Fixture::new(ScriptedToolchain::happy_path());
        let report = fixture
            .pipeline(HarnessConfig::default())
            .run("source1.plc")
            .await
            .unwrap();

        assert_eq!(report.outcome, PipelineOutcome::Completed { exit_code: 0 });
        assert_eq!(
            fixture.toolchain.invoked_stages(),
            vec![StageKind::Generate, StageKind::Compile, StageKind::Execute]
        );
        assert!(fixture.buffer.contents().contains("Generated:   Main.java"));
        assert!(fixture.buffer.contents().contains("Compiled:    Main"));
        assert_eq!(
            fixture.events.names(),
            vec![
                "pipeline.started",
                "stage.started",
                "stage.completed",
                "stage.started",
                "stage.completed",
                "stage.started",
                "stage.completed",
                "pipeline.completed",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_source_invokes_nothing() {
        let fixture = Fixture::new(ScriptedToolchain::happy_path());
        let err = fixture
            .pipeline(HarnessConfig::default())
            .run("nope.plc")
            .await
            .unwrap_err();

        assert!(matches!(err, HarnessError::SourceNotFound { .. }));
        assert_eq!(fixture.toolchain.call_count(), 0);
        assert_eq!(fixture.events.names(), vec!["pipeline.started", "pipeline.failed"]);
    }

    #[tokio::test]
    async fn test_compile_failure_is_hard_stop() {
        let toolchain = ScriptedToolchain::happy_path().on(
            StageKind::Compile,
            ToolScript::succeed().creating("Main.class").exiting(Some(1)),
        );
        let fixture = Fixture::new(toolchain);

        let err = fixture
            .pipeline(HarnessConfig::default())
            .run("source1.plc")
            .await
            .unwrap_err();

        match err {
            HarnessError::ToolFailed { stage, program, code } => {
                assert_eq!(stage, StageKind::Compile);
                assert_eq!(program, "javac");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            fixture.toolchain.invoked_stages(),
            vec![StageKind::Generate, StageKind::Compile]
        );
    }

    #[tokio::test]
    async fn test_program_exit_code_is_reported() {
        let toolchain = ScriptedToolchain::happy_path()
            .on(StageKind::Execute, ToolScript::succeed().exiting(Some(3)));
        let fixture = Fixture::new(toolchain);

        let report = fixture
            .pipeline(HarnessConfig::default())
            .run("source1.plc")
            .await
            .unwrap();

        assert_eq!(report.exit_code(), 3);
        assert_eq!(report.stage(StageKind::Execute).unwrap().status, StageStatus::Fail);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let fixture = Fixture::new(ScriptedToolchain::happy_path());
        let pipeline = fixture.pipeline(HarnessConfig::default());
        pipeline.token().cancel("interrupt");

        let report = pipeline.run("source1.plc").await.unwrap();

        assert_eq!(
            report.outcome,
            PipelineOutcome::Interrupted { stage: StageKind::Generate }
        );
        assert_eq!(fixture.toolchain.call_count(), 0);
        assert_eq!(fixture.buffer.contents().matches("Exiting Harness...").count(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_wins_over_tool_exit_code() {
        let toolchain = ScriptedToolchain::happy_path().on(
            StageKind::Compile,
            ToolScript::succeed().exiting(Some(1)).cancelling(),
        );
        let fixture = Fixture::new(toolchain);

        let report = fixture
            .pipeline(HarnessConfig::default())
            .run("source1.plc")
            .await
            .unwrap();

        assert_eq!(report.outcome, PipelineOutcome::Interrupted { stage: StageKind::Compile });
        let compile = report.stage(StageKind::Compile).unwrap();
        assert_eq!(compile.status, StageStatus::Cancel);
        assert_eq!(compile.cancel_reason.as_deref(), Some("interrupt"));
        assert_eq!(
            fixture.toolchain.invoked_stages(),
            vec![StageKind::Generate, StageKind::Compile]
        );
        assert_eq!(fixture.events.count(names::STAGE_FAILED), 0);
        assert_eq!(fixture.events.count(names::PIPELINE_INTERRUPTED), 1);
    }

    #[tokio::test]
    async fn test_harness_dir_relative_to_launch_dir() {
        let fixture = Fixture::new(ScriptedToolchain::happy_path());
        let config = HarnessConfig::default().with_harness_dir("harness");

        fixture.pipeline(config).run("source1.plc").await.unwrap();

        let generate = &fixture.toolchain.invocations()[0];
        let expected = fixture.launch.path().join("harness");
        assert_eq!(generate.args[1], expected.into_os_string());
    }

    #[tokio::test]
    async fn test_in_place_passes_source_as_given() {
        let fixture = Fixture::new(ScriptedToolchain::happy_path());
        let config = HarnessConfig::default().with_workspace(WorkspaceMode::InPlace);

        let report = fixture.pipeline(config).run("source1.plc").await.unwrap();

        let generate = &fixture.toolchain.invocations()[0];
        assert_eq!(generate.args_lossy(), vec!["Harness", "source1.plc"]);
        assert_eq!(generate.cwd, fixture.launch.path());
        assert!(!report.scoped);
        // In-place artifacts stay for inspection.
        assert!(fixture.launch.path().join("Main.class").is_file());
    }
}
