//! Logging setup for the batch pipeline.
//!
//! Two sinks over one `tracing` registry:
//! - the run log file: truncated at startup, header line written, then
//!   append-only for the rest of the run, no ANSI codes;
//! - stderr: mirrors everything at INFO and above in real time, so the
//!   console shows the run while DEBUG detail stays file-only.
//!
//! Fatal preconditions are logged as `error!` with `critical = true`
//! (tracing has no CRITICAL level).

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global subscriber.
///
/// Truncates `log_path`, writes a header line, then installs the
/// file + stderr layers. The returned guard must stay alive for the
/// duration of the run or buffered log lines are lost.
///
/// Can only succeed once per process; later calls fail.
pub fn init_logging(program_name: &str, log_path: &Path) -> Result<WorkerGuard> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
    }

    // Truncate and stamp the header, then reopen append-only so the
    // appender never rewrites earlier lines.
    {
        let mut file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        writeln!(
            file,
            "=== {} run started {} ===",
            program_name,
            chrono::Local::now().to_rfc3339()
        )?;
    }

    let file = OpenOptions::new()
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Logging already initialized: {e}"))?;

    tracing::debug!(
        program = program_name,
        log_file = %log_path.display(),
        "Logging initialized"
    );

    Ok(guard)
}

/// Outcome of one external tool invocation.
#[derive(Debug)]
pub struct ExternalCommandResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: std::time::Duration,
}

impl ExternalCommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run an external tool, capture both pipes, and log the invocation.
///
/// Returns the raw `io::Error` on spawn failure so callers can tell a
/// missing executable (`ErrorKind::NotFound`) apart from a tool that
/// ran and failed.
pub fn execute_external_command(
    tool: &str,
    args: &[&str],
) -> std::io::Result<ExternalCommandResult> {
    use std::process::Command;

    let command_str = format!("{} {}", tool, args.join(" "));
    tracing::debug!(command = %command_str, "Executing external command");

    let start = std::time::Instant::now();
    let output = Command::new(tool).args(args).output()?;
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code();

    log_external_tool(tool, &command_str, &stderr, exit_code, duration);

    Ok(ExternalCommandResult {
        exit_code,
        stdout,
        stderr,
        duration,
    })
}

fn log_external_tool(
    tool: &str,
    command: &str,
    stderr: &str,
    exit_code: Option<i32>,
    duration: std::time::Duration,
) {
    match exit_code {
        Some(0) => {
            tracing::debug!(
                tool,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                "External tool completed"
            );
        }
        Some(code) => {
            tracing::debug!(
                tool,
                command = %command,
                exit_code = code,
                duration_secs = duration.as_secs_f64(),
                stderr = %stderr.trim(),
                "External tool failed"
            );
        }
        None => {
            tracing::debug!(
                tool,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                "External tool terminated by signal"
            );
        }
    }
}
