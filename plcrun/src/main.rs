//! Command-line entry point.

use anyhow::Context;
use clap::Parser;
use plcrun::cancellation::listen_for_interrupts;
use plcrun::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run the PLC generator harness on a source file, then compile and run the result.
#[derive(Debug, Parser)]
#[command(name = "plcrun", version, about)]
struct Cli {
    /// PLC source file to run
    source: PathBuf,
}

/// Diagnostics are opt-in through `RUST_LOG`; stdout belongs to the program.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let launch_dir = std::env::current_dir().context("cannot determine the launch directory")?;

    let config = HarnessConfig::load(&launch_dir);
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());
    let config = config?;
    debug!(?config, "Loaded configuration");

    let token = Arc::new(CancellationToken::new());
    let listener = listen_for_interrupts(Arc::clone(&token))
        .context("cannot install the interrupt handler")?;

    let pipeline = Pipeline::new(config, launch_dir, Arc::new(SystemToolchain::new()))
        .with_event_sink(Arc::new(LoggingEventSink))
        .with_token(token);
    let result = pipeline.run(&cli.source).await;
    listener.abort();

    let report = result?;
    if let Ok(json) = serde_json::to_string(&report) {
        debug!(report = %json, "Run report");
    }
    Ok(report.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<HarnessError>()
                .map_or(1, HarnessError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
