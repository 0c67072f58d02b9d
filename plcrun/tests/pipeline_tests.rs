//! End-to-end pipeline scenarios driven through the scripted toolchain.

use plcrun::console::FAREWELL;
use plcrun::testing::CollectingEventSink;
use plcrun::prelude::*;
use plcrun::testing::{ScriptedToolchain, SharedBuffer, ToolScript};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    launch: TempDir,
    toolchain: Arc<ScriptedToolchain>,
    output: SharedBuffer,
    events: Arc<CollectingEventSink>,
}

impl Harness {
    fn new(toolchain: ScriptedToolchain) -> Self {
        let launch = tempfile::tempdir().unwrap();
        for name in ["source1.plc", "bad.plc"] {
            std::fs::write(launch.path().join(name), "DEF main() DO print(1); END").unwrap();
        }
        Self {
            launch,
            toolchain: Arc::new(toolchain),
            output: SharedBuffer::new(),
            events: Arc::new(CollectingEventSink::new()),
        }
    }

    fn pipeline(&self, config: HarnessConfig) -> Pipeline {
        Pipeline::new(config, self.launch.path(), self.toolchain.clone())
            .with_console(Arc::new(Console::with_writer(self.output.clone())))
            .with_event_sink(self.events.clone())
    }

    async fn run(&self, source: &str) -> Result<PipelineReport, HarnessError> {
        self.pipeline(HarnessConfig::default()).run(source).await
    }
}

#[tokio::test]
async fn source1_generates_compiles_and_runs_in_order() {
    let harness = Harness::new(ScriptedToolchain::happy_path());

    let report = harness.run("source1.plc").await.unwrap();
    assert_eq!(report.outcome, PipelineOutcome::Completed { exit_code: 0 });

    let records = harness.toolchain.records();
    assert_eq!(records.len(), 3);

    let generate = &records[0].invocation;
    assert_eq!(generate.stage, StageKind::Generate);
    assert_eq!(generate.program, "java");
    assert!(Path::new(generate.args.last().unwrap()).ends_with("source1.plc"));
    assert!(generate.args_lossy().contains(&"Harness".to_string()));

    let compile = &records[1].invocation;
    assert_eq!(compile.stage, StageKind::Compile);
    assert_eq!(compile.program, "javac");
    assert_eq!(compile.args_lossy(), vec!["Main.java"]);
    assert!(records[1].files_present.contains(&"Main.java".to_string()));

    let execute = &records[2].invocation;
    assert_eq!(execute.stage, StageKind::Execute);
    assert_eq!(execute.program, "java");
    assert_eq!(execute.args_lossy(), vec!["Main"]);
    assert!(records[2].files_present.contains(&"Main.class".to_string()));
}

#[tokio::test]
async fn bad_source_stops_after_generation() {
    let toolchain = ScriptedToolchain::new().on(StageKind::Generate, ToolScript::succeed());
    let harness = Harness::new(toolchain);

    let report = harness.run("bad.plc").await.unwrap();

    assert_eq!(harness.toolchain.invoked_stages(), vec![StageKind::Generate]);
    assert_eq!(
        report.outcome,
        PipelineOutcome::Stopped {
            stage: StageKind::Generate,
            reason: "Main.java was not produced".to_string(),
        }
    );
    assert_eq!(report.exit_code(), 0);
    assert!(!harness.output.contents().contains("Generated:"));
    assert_eq!(harness.events.count("stage.skipped"), 1);
}

#[tokio::test]
async fn missing_class_file_skips_execution() {
    let toolchain = ScriptedToolchain::new()
        .on(StageKind::Generate, ToolScript::succeed().creating("Main.java"))
        .on(StageKind::Compile, ToolScript::succeed());
    let harness = Harness::new(toolchain);

    let report = harness.run("source1.plc").await.unwrap();

    assert_eq!(
        harness.toolchain.invoked_stages(),
        vec![StageKind::Generate, StageKind::Compile]
    );
    assert!(matches!(
        report.outcome,
        PipelineOutcome::Stopped { stage: StageKind::Compile, .. }
    ));
    let output = harness.output.contents();
    assert!(output.contains("Generated:   Main.java"));
    assert!(!output.contains("Compiled:"));
    assert!(!output.contains("OUTPUT"));
}

#[tokio::test]
async fn interrupt_in_any_stage_prints_farewell_once() {
    for stage in StageKind::ALL {
        let harness = Harness::new(ScriptedToolchain::happy_path().on(stage, ToolScript::interrupted()));

        let report = harness.run("source1.plc").await.unwrap();

        assert_eq!(report.outcome, PipelineOutcome::Interrupted { stage });
        assert_eq!(report.exit_code(), 0);
        assert_eq!(harness.toolchain.invoked_stages().last(), Some(&stage));
        assert_eq!(harness.output.contents().matches(FAREWELL).count(), 1, "stage {stage}");
        assert_eq!(harness.events.count("pipeline.interrupted"), 1);
    }
}

#[tokio::test]
async fn interrupt_is_not_a_failure_when_tool_exits_nonzero() {
    for stage in StageKind::ALL {
        let toolchain = ScriptedToolchain::happy_path().on(
            stage,
            ToolScript::succeed().exiting(Some(1)).cancelling(),
        );
        let harness = Harness::new(toolchain);

        let report = harness.run("source1.plc").await.unwrap();

        assert_eq!(report.outcome, PipelineOutcome::Interrupted { stage });
        assert_eq!(report.exit_code(), 0);
        assert_eq!(harness.toolchain.invoked_stages().last(), Some(&stage));
        assert_eq!(harness.output.contents().matches(FAREWELL).count(), 1, "stage {stage}");
        assert_eq!(harness.events.count("pipeline.failed"), 0);
    }
}

#[tokio::test]
async fn interrupt_after_generation_stops_before_compile() {
    let toolchain = ScriptedToolchain::happy_path().on(
        StageKind::Generate,
        ToolScript::succeed().creating("Main.java").cancelling(),
    );
    let harness = Harness::new(toolchain);

    let report = harness.run("source1.plc").await.unwrap();

    assert_eq!(report.outcome, PipelineOutcome::Interrupted { stage: StageKind::Generate });
    assert_eq!(harness.toolchain.invoked_stages(), vec![StageKind::Generate]);
    let output = harness.output.contents();
    assert_eq!(output.matches(FAREWELL).count(), 1);
    assert!(!output.contains("Compiled:"));
}

#[tokio::test]
async fn generator_failure_stops_even_with_artifact() {
    let toolchain = ScriptedToolchain::happy_path().on(
        StageKind::Generate,
        ToolScript::succeed().creating("Main.java").exiting(Some(1)),
    );
    let harness = Harness::new(toolchain);

    let err = harness.run("source1.plc").await.unwrap_err();

    assert!(matches!(
        err,
        HarnessError::ToolFailed { stage: StageKind::Generate, code: Some(1), .. }
    ));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(harness.toolchain.call_count(), 1);
}

#[tokio::test]
async fn missing_compiler_is_reported() {
    let toolchain = ScriptedToolchain::happy_path().on(StageKind::Compile, ToolScript::missing());
    let harness = Harness::new(toolchain);

    let err = harness.run("source1.plc").await.unwrap_err();

    assert!(matches!(err, HarnessError::ToolNotFound { stage: StageKind::Compile, .. }));
    assert_eq!(err.exit_code(), 127);
    assert_eq!(harness.events.count("pipeline.failed"), 1);
}

#[tokio::test]
async fn missing_source_is_reported_before_any_tool_runs() {
    let harness = Harness::new(ScriptedToolchain::happy_path());

    let err = harness.run("does-not-exist.plc").await.unwrap_err();

    assert!(matches!(err, HarnessError::SourceNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(harness.toolchain.call_count(), 0);
    assert!(harness.output.contents().is_empty());
}

#[tokio::test]
async fn scoped_workspace_is_removed_on_every_exit_path() {
    let scripts = [
        ScriptedToolchain::happy_path(),
        ScriptedToolchain::new(),
        ScriptedToolchain::happy_path().on(StageKind::Compile, ToolScript::succeed().exiting(Some(2))),
        ScriptedToolchain::happy_path().on(StageKind::Execute, ToolScript::interrupted()),
    ];

    for toolchain in scripts {
        let harness = Harness::new(toolchain);
        let _ = harness.run("source1.plc").await;

        let dirs: Vec<_> = harness
            .toolchain
            .invocations()
            .into_iter()
            .map(|inv| inv.cwd)
            .collect();
        assert!(!dirs.is_empty());
        for dir in dirs {
            assert_ne!(dir, harness.launch.path());
            assert!(!dir.exists(), "{} was left behind", dir.display());
        }
    }
}

#[tokio::test]
async fn stale_artifacts_in_launch_dir_are_ignored() {
    let harness = Harness::new(ScriptedToolchain::new());
    std::fs::write(harness.launch.path().join("Main.java"), "class Main {}").unwrap();
    std::fs::write(harness.launch.path().join("Main.class"), b"\xca\xfe\xba\xbe").unwrap();

    let report = harness.run("source1.plc").await.unwrap();

    assert_eq!(harness.toolchain.invoked_stages(), vec![StageKind::Generate]);
    assert!(matches!(report.outcome, PipelineOutcome::Stopped { .. }));
}

#[tokio::test]
async fn in_place_mode_clears_stale_artifacts() {
    let harness = Harness::new(ScriptedToolchain::new());
    std::fs::write(harness.launch.path().join("Main.java"), "class Main {}").unwrap();

    let config = HarnessConfig::default().with_workspace(WorkspaceMode::InPlace);
    let report = harness.pipeline(config).run("bad.plc").await.unwrap();

    assert_eq!(harness.toolchain.invoked_stages(), vec![StageKind::Generate]);
    assert!(matches!(report.outcome, PipelineOutcome::Stopped { .. }));
    assert!(!harness.launch.path().join("Main.java").exists());
}

#[tokio::test]
async fn console_transcript_for_full_run() {
    let harness = Harness::new(ScriptedToolchain::happy_path());

    harness.run("source1.plc").await.unwrap();

    assert_eq!(
        harness.output.contents(),
        "\nRunning the test harness on ->  source1.plc \n\n\
         Generated:   Main.java \n\n\
         Compiled:    Main \n\nOUTPUT\n\n\
         \n"
    );
}

#[tokio::test]
async fn custom_tool_names_are_used() {
    let harness = Harness::new(ScriptedToolchain::happy_path());
    let config = HarnessConfig::default()
        .with_runtime("/opt/jdk/bin/java")
        .with_compiler("ecj")
        .with_harness_entry("plc.Harness");

    harness.pipeline(config).run("source1.plc").await.unwrap();

    let programs: Vec<String> = harness
        .toolchain
        .invocations()
        .into_iter()
        .map(|inv| inv.program)
        .collect();
    assert_eq!(programs, vec!["/opt/jdk/bin/java", "ecj", "/opt/jdk/bin/java"]);
    assert!(harness.toolchain.invocations()[0]
        .args_lossy()
        .contains(&"plc.Harness".to_string()));
}
