//! Per-file conversion worker.
//!
//! Drives one `FileTask` through the full state machine: skip if the
//! destination already exists, stream-copy remux via ffmpeg, exit-code
//! check, probe-based validation, timestamp preservation, then source
//! cleanup or ledger quarantine. Every error is absorbed here and
//! folded into an `Outcome` — a bad file never aborts the batch.
//!
//! No timeout is applied to the child process; a hung ffmpeg blocks
//! the batch until the operator kills it.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use shared_utils::logging::execute_external_command;
use shared_utils::{
    apply_timestamps, inspect, validate, BatchConfig, FileTask, ManualReviewLedger, RemuxError,
};

/// Terminal state of one file's conversion. Variants are mutually
/// exclusive and cover every exit from the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Destination already present; no transcode attempted.
    SkippedExisting,
    /// Remuxed, validated, timestamps applied.
    Converted,
    /// Transcoder exited non-zero; partial output removed, source kept.
    TranscodeFailed,
    /// Output failed the acceptance policy; output removed, source
    /// kept, ledger entry written.
    ValidationFailed,
    /// Transcoder could not be launched at all.
    SpawnFailed,
}

/// `<output_dir>/<stem>.mp4` for a task. A basename collision with an
/// earlier conversion is what the skip path detects.
pub fn destination_path(task: &FileTask, config: &BatchConfig) -> PathBuf {
    let stem = task
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    config.resolved_output_dir().join(format!("{}.mp4", stem))
}

/// Stream-copy remux: no re-encode, regenerate presentation
/// timestamps on the way in, index metadata up front on the way out.
fn run_transcoder(
    task: &FileTask,
    dest: &Path,
    config: &BatchConfig,
) -> shared_utils::Result<()> {
    let src = task.path.to_string_lossy();
    let dst = dest.to_string_lossy();
    let args = [
        "-v",
        "error",
        "-fflags",
        "+genpts",
        "-i",
        src.as_ref(),
        "-c",
        "copy",
        "-movflags",
        "+faststart",
        "-y",
        dst.as_ref(),
    ];

    let result =
        execute_external_command(&config.ffmpeg_path, &args).map_err(|source| {
            RemuxError::SpawnFailed {
                tool: config.ffmpeg_path.clone(),
                source,
            }
        })?;

    if !result.success() {
        return Err(RemuxError::TranscodeFailed {
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }
    Ok(())
}

fn remove_best_effort(path: &Path, what: &str) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove {}", what);
        }
    }
}

fn delete_source(task: &FileTask) {
    match std::fs::remove_file(&task.path) {
        Ok(()) => info!(path = %task.path.display(), "Deleted source file"),
        Err(e) => warn!(
            path = %task.path.display(),
            error = %e,
            "Failed to delete source file"
        ),
    }
}

/// Convert one file. Infallible by contract: every failure mode maps
/// to an `Outcome` and is already logged when this returns.
pub fn convert(task: &FileTask, config: &BatchConfig, ledger: &ManualReviewLedger) -> Outcome {
    let dest = destination_path(task, config);

    // Already converted on a previous run.
    if dest.exists() {
        warn!(
            source = %task.path.display(),
            dest = %dest.display(),
            "Destination exists, skipping conversion"
        );
        if config.delete_source_on_success {
            delete_source(task);
        }
        return Outcome::SkippedExisting;
    }

    match run_transcoder(task, &dest, config) {
        Ok(()) => {}
        Err(e @ RemuxError::SpawnFailed { .. }) => {
            error!(
                critical = true,
                source = %task.path.display(),
                error = %e,
                "Failed to launch transcoder; file left untouched"
            );
            return Outcome::SpawnFailed;
        }
        Err(e) => {
            error!(
                source = %task.path.display(),
                error = %e,
                "Transcoder failed; leaving source for manual reprocessing"
            );
            remove_best_effort(&dest, "partial output");
            return Outcome::TranscodeFailed;
        }
    }

    // Zero exit: accept only if the probe agrees the output is a
    // playable mp4.
    let report = inspect(&config.ffprobe_path, &dest);
    let output_size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
    let verdict = validate(
        report.as_ref(),
        output_size,
        Some(task.size_bytes),
        config.max_size_delta_bytes,
    );

    if !verdict.ok {
        warn!(
            source = %task.path.display(),
            dest = %dest.display(),
            reasons = %verdict.joined_reasons(),
            "Output failed validation; discarding output, source preserved"
        );
        remove_best_effort(&dest, "invalid output");
        ledger.append(&task.path, &verdict.joined_reasons());
        return Outcome::ValidationFailed;
    }

    apply_timestamps(&dest, task.accessed, task.modified);

    if config.delete_source_on_success {
        delete_source(task);
    }

    info!(
        source = %task.path.display(),
        dest = %dest.display(),
        size_bytes = output_size,
        "Converted and validated"
    );
    Outcome::Converted
}
