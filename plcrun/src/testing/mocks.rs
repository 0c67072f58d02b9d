//! Scripted toolchain and console capture for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::core::StageKind;
use crate::errors::HarnessError;
use crate::toolchain::{Invocation, ProcessExit, Toolchain};

/// What a faked tool does when invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolScript {
    /// Files written into the working directory.
    pub creates: Vec<String>,
    /// Exit code reported, `None` for death by signal.
    pub exit_code: Option<i32>,
    /// Simulates the user pressing Ctrl-C while the tool runs.
    pub interrupt: bool,
    /// Ctrl-C arrives but the tool still reports `exit_code`.
    pub cancels: bool,
    /// Simulates the tool not being installed.
    pub missing: bool,
}

impl Default for ToolScript {
    fn default() -> Self {
        Self::succeed()
    }
}

impl ToolScript {
    /// Exits with status zero and writes nothing.
    #[must_use]
    pub const fn succeed() -> Self {
        Self {
            creates: Vec::new(),
            exit_code: Some(0),
            interrupt: false,
            cancels: false,
            missing: false,
        }
    }

    /// Adds a file to write into the working directory.
    #[must_use]
    pub fn creating(mut self, file: impl Into<String>) -> Self {
        self.creates.push(file.into());
        self
    }

    /// Sets the exit code.
    #[must_use]
    pub fn exiting(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    /// Cancels the run's token, then exits normally with the scripted code.
    #[must_use]
    pub fn cancelling(mut self) -> Self {
        self.cancels = true;
        self
    }

    /// Cancels the run's token while the tool runs.
    #[must_use]
    pub const fn interrupted() -> Self {
        Self {
            creates: Vec::new(),
            exit_code: None,
            interrupt: true,
            cancels: false,
            missing: false,
        }
    }

    /// Fails to spawn with a not-found error.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            creates: Vec::new(),
            exit_code: None,
            interrupt: false,
            cancels: false,
            missing: true,
        }
    }
}

/// One recorded call to [`ScriptedToolchain::run`].
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    /// The invocation as issued.
    pub invocation: Invocation,
    /// File names present in the working directory when the call started.
    pub files_present: Vec<String>,
}

/// A toolchain that follows per-stage scripts instead of spawning processes.
///
/// Stages without a script succeed and write nothing.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    scripts: Mutex<HashMap<StageKind, ToolScript>>,
    records: Mutex<Vec<InvocationRecord>>,
}

impl ScriptedToolchain {
    /// Creates a toolchain with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stage succeeds and writes the default artifacts.
    #[must_use]
    pub fn happy_path() -> Self {
        Self::new()
            .on(StageKind::Generate, ToolScript::succeed().creating("Main.java"))
            .on(StageKind::Compile, ToolScript::succeed().creating("Main.class"))
    }

    /// Sets the script for a stage.
    #[must_use]
    pub fn on(self, stage: StageKind, script: ToolScript) -> Self {
        self.scripts.lock().insert(stage, script);
        self
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn records(&self) -> Vec<InvocationRecord> {
        self.records.lock().clone()
    }

    /// Returns the recorded invocations in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.records.lock().iter().map(|r| r.invocation.clone()).collect()
    }

    /// Returns the stages invoked, in order.
    #[must_use]
    pub fn invoked_stages(&self) -> Vec<StageKind> {
        self.records.lock().iter().map(|r| r.invocation.stage).collect()
    }

    /// Returns the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.records.lock().len()
    }
}

fn list_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[async_trait]
impl Toolchain for ScriptedToolchain {
    async fn run(
        &self,
        invocation: &Invocation,
        token: &CancellationToken,
    ) -> Result<ProcessExit, HarnessError> {
        self.records.lock().push(InvocationRecord {
            invocation: invocation.clone(),
            files_present: list_files(&invocation.cwd),
        });

        let script = self
            .scripts
            .lock()
            .get(&invocation.stage)
            .cloned()
            .unwrap_or_default();

        if script.missing {
            return Err(HarnessError::from_spawn(
                invocation.stage,
                invocation.program.clone(),
                io::Error::new(io::ErrorKind::NotFound, "scripted missing tool"),
            ));
        }

        for file in &script.creates {
            std::fs::write(invocation.cwd.join(file), b"")?;
        }

        if script.interrupt {
            token.cancel("interrupt");
            return Ok(ProcessExit::Interrupted);
        }
        if script.cancels {
            token.cancel("interrupt");
        }

        Ok(ProcessExit::Exited {
            code: script.exit_code,
        })
    }
}

/// A cloneable in-memory writer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
