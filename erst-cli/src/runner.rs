//! Simulator runner
//!
//! Runs one simulation by spawning the simulator executable, writing the
//! request JSON to its stdin, and parsing the JSON response from its stdout.

use anyhow::{Context, Result, anyhow, bail};
use erst_core::simulation::{SimulationRequest, SimulationResponse};
use erst_scheduler::Runner;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runner that delegates to an external simulator process
#[derive(Debug, Clone)]
pub struct SimulatorRunner {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SimulatorRunner {
    /// Creates a runner for the given simulator executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds arguments passed to every simulator invocation
    #[cfg(test)]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Runner for SimulatorRunner {
    type Input = SimulationRequest;
    type Output = SimulationResponse;

    fn run(&self, request: SimulationRequest) -> Result<SimulationResponse> {
        let payload = serde_json::to_vec(&request).context("Failed to encode simulation request")?;

        debug!("Spawning simulator {}", self.program.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start simulator {}", self.program.display()))?;

        // stdin is closed when the handle drops, which ends the simulator's read
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Err(io::Error::other("simulator stdin was not captured")),
        };

        // Reap the child even when the write failed; its exit status and
        // stderr explain why it stopped reading
        let output = child
            .wait_with_output()
            .context("Failed to read simulator output")?;

        match sent {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Simulator exited before reading the whole request");
            }
            Err(err) if output.status.success() => {
                return Err(err).context("Failed to send request to simulator");
            }
            Err(err) => debug!("Failed to send request to simulator: {}", err),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Simulator exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        let response: SimulationResponse = serde_json::from_slice(&output.stdout)
            .context("Failed to parse simulator response")?;

        if !response.is_success() {
            let message = response
                .error
                .unwrap_or_else(|| format!("simulator reported status '{}'", response.status));
            return Err(anyhow!(message));
        }

        Ok(response)
    }
}

/// Reads a simulation request from a JSON file
pub fn load_request(path: &Path) -> Result<SimulationRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid simulation request in {}", path.display()))
}
