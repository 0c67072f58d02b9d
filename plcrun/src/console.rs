//! User-facing progress messages.
//!
//! These go to stdout and interleave with the output of the tools, which
//! inherit the same stdout. Diagnostics belong in `tracing`, not here.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Farewell printed when the user interrupts a run.
pub const FAREWELL: &str = "Exiting Harness...";

/// Writes progress messages for one run.
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    farewell_printed: AtomicBool,
}

impl Console {
    /// Creates a console writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Creates a console writing to the given writer.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            farewell_printed: AtomicBool::new(false),
        }
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = self.out.lock();
        out.write_all(text.as_bytes())?;
        // Flush before any child process writes to the shared stdout.
        out.flush()
    }

    /// Announces the source file being run.
    pub fn banner(&self, source: &Path) -> io::Result<()> {
        self.write(&format!(
            "\nRunning the test harness on ->  {} \n\n",
            source.display()
        ))
    }

    /// Announces the generated file.
    pub fn generated(&self, file_name: &str) -> io::Result<()> {
        self.write(&format!("Generated:   {file_name} \n\n"))
    }

    /// Announces the compiled program and the start of its output.
    pub fn compiled(&self, program_name: &str) -> io::Result<()> {
        self.write(&format!("Compiled:    {program_name} \n\nOUTPUT\n\n"))
    }

    /// Prints the farewell message.
    ///
    /// Only the first call prints; returns true if this call printed it.
    pub fn farewell(&self) -> io::Result<bool> {
        if self.farewell_printed.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        self.write(&format!("\n{FAREWELL}\n"))?;
        Ok(true)
    }

    /// Ends the run's output with a blank line.
    pub fn finish(&self) -> io::Result<()> {
        self.write("\n")
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("farewell_printed", &self.farewell_printed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
