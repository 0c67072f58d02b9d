//! Harness configuration.
//!
//! Values come from defaults, then an optional JSON file, then environment
//! overrides.

use crate::errors::HarnessError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "PLCRUN_CONFIG";

/// File looked up in the launch directory when `PLCRUN_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "plcrun.json";

/// Where the tools run and the artifacts land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceMode {
    /// A fresh temporary directory per run, removed afterwards.
    #[default]
    Scoped,
    /// The launch directory; stale artifacts are cleared before each stage.
    InPlace,
}

impl std::str::FromStr for WorkspaceMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scoped" => Ok(Self::Scoped),
            "in_place" | "in-place" | "inplace" => Ok(Self::InPlace),
            other => Err(HarnessError::Config(format!("unknown workspace mode '{other}'"))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(HarnessError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Configuration for a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Runtime used to run the generator and the compiled program.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Compiler used on the generated file.
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Entry point passed to the runtime for the generate stage.
    #[serde(default = "default_harness_entry")]
    pub harness_entry: String,
    /// File the generator is expected to write.
    #[serde(default = "default_generated_file")]
    pub generated_file: String,
    /// File the compiler is expected to write.
    #[serde(default = "default_compiled_file")]
    pub compiled_file: String,
    /// Name passed to the runtime for the execute stage.
    #[serde(default = "default_program_name")]
    pub program_name: String,
    /// Flag pointing the runtime at the harness directory in scoped mode.
    #[serde(default = "default_classpath_flag")]
    pub classpath_flag: String,
    /// Directory holding the harness. Defaults to the launch directory.
    #[serde(default)]
    pub harness_dir: Option<PathBuf>,
    /// Workspace mode.
    #[serde(default)]
    pub workspace: WorkspaceMode,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_runtime() -> String {
    "java".to_string()
}

fn default_compiler() -> String {
    "javac".to_string()
}

fn default_harness_entry() -> String {
    "Harness".to_string()
}

fn default_generated_file() -> String {
    "Main.java".to_string()
}

fn default_compiled_file() -> String {
    "Main.class".to_string()
}

fn default_program_name() -> String {
    "Main".to_string()
}

fn default_classpath_flag() -> String {
    "-cp".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            compiler: default_compiler(),
            harness_entry: default_harness_entry(),
            generated_file: default_generated_file(),
            compiled_file: default_compiled_file(),
            program_name: default_program_name(),
            classpath_flag: default_classpath_flag(),
            harness_dir: None,
            workspace: WorkspaceMode::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl HarnessConfig {
    /// Sets the runtime.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Sets the compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Sets the harness entry point.
    #[must_use]
    pub fn with_harness_entry(mut self, entry: impl Into<String>) -> Self {
        self.harness_entry = entry.into();
        self
    }

    /// Sets the harness directory.
    #[must_use]
    pub fn with_harness_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.harness_dir = Some(dir.into());
        self
    }

    /// Sets the workspace mode.
    #[must_use]
    pub fn with_workspace(mut self, mode: WorkspaceMode) -> Self {
        self.workspace = mode;
        self
    }

    /// Loads the configuration for a run launched from `launch_dir`.
    ///
    /// Reads `PLCRUN_CONFIG` if set, else `plcrun.json` in the launch
    /// directory if it exists, then applies environment overrides.
    pub fn load(launch_dir: &Path) -> Result<Self, HarnessError> {
        Self::load_with(launch_dir, |key| std::env::var(key).ok())
    }

    /// Same as [`HarnessConfig::load`] with an explicit environment lookup.
    pub fn load_with<F>(launch_dir: &Path, env: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match env(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let candidate = launch_dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        debug!(path = %path.display(), "Loading configuration file");
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| HarnessError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Applies `PLCRUN_*` environment overrides.
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(runtime) = env("PLCRUN_RUNTIME") {
            self.runtime = runtime;
        }
        if let Some(compiler) = env("PLCRUN_COMPILER") {
            self.compiler = compiler;
        }
        if let Some(mode) = env("PLCRUN_WORKSPACE") {
            self.workspace = mode.parse()?;
        }
        if let Some(format) = env("PLCRUN_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }

    /// Checks that every tool and file name is usable.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let required = [
            ("runtime", &self.runtime),
            ("compiler", &self.compiler),
            ("harness_entry", &self.harness_entry),
            ("generated_file", &self.generated_file),
            ("compiled_file", &self.compiled_file),
            ("program_name", &self.program_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(HarnessError::Config(format!("'{field}' must not be empty")));
            }
        }
        for (field, value) in [
            ("generated_file", &self.generated_file),
            ("compiled_file", &self.compiled_file),
        ] {
            if Path::new(value).components().count() != 1 {
                return Err(HarnessError::Config(format!(
                    "'{field}' must be a plain file name, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}
