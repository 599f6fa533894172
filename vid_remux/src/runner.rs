//! Batch orchestration.
//!
//! Fatal preconditions first (target directory, free space), then one
//! size-bounded batch collected and drained strictly in sequence —
//! one ffmpeg process alive at a time, by design, to keep disk I/O
//! and the external tool uncontended.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::worker::{self, Outcome};
use shared_utils::{available_bytes, collect, BatchConfig, ManualReviewLedger, RemuxError};

/// Tally of one run. `attempted` counts every task handed to the
/// worker; the other fields split it by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub attempted: usize,
    pub converted: usize,
    pub skipped_existing: usize,
    pub transcode_failed: usize,
    pub validation_failed: usize,
    pub spawn_failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Converted => self.converted += 1,
            Outcome::SkippedExisting => self.skipped_existing += 1,
            Outcome::TranscodeFailed => self.transcode_failed += 1,
            Outcome::ValidationFailed => self.validation_failed += 1,
            Outcome::SpawnFailed => self.spawn_failed += 1,
        }
    }
}

/// Run one batch. Fatal preconditions log at CRITICAL and surface as
/// typed errors before any file is touched; per-file failures are
/// absorbed by the worker and only show up in the tallies.
pub fn run(config: &BatchConfig) -> Result<Summary> {
    let mut summary = Summary::default();

    if !config.target_dir.is_dir() {
        error!(
            critical = true,
            target = %config.target_dir.display(),
            "Target directory does not exist, aborting run"
        );
        return Err(RemuxError::TargetDirMissing(config.target_dir.clone()).into());
    }

    let output_dir = config.resolved_output_dir();
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let ledger = ManualReviewLedger::new(&config.ledger_path);
    if config.reset_ledger {
        ledger
            .reset()
            .context("Failed to reset manual-review ledger")?;
    }

    // Free-space gate: a failed query counts as zero available, so
    // the run aborts instead of filling the disk mid-file.
    if let Some(threshold) = config.space_threshold_bytes {
        let available = match available_bytes(output_dir) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Free-space query failed, assuming zero available");
                0
            }
        };
        if available < threshold {
            error!(
                critical = true,
                available,
                threshold,
                output_dir = %output_dir.display(),
                "Insufficient free space on output volume, aborting run"
            );
            return Err(RemuxError::InsufficientSpace {
                available,
                required: threshold,
            }
            .into());
        }
        info!(available, threshold, "Free-space check passed");
    }

    let batch = collect(
        &config.target_dir,
        &config.extension_refs(),
        config.max_batch_bytes,
    );

    if batch.is_empty() {
        info!(target = %config.target_dir.display(), "No convertible files found");
        return Ok(summary);
    }

    info!(
        files = batch.len(),
        total_bytes = batch.total_bytes,
        "Batch collected, converting sequentially"
    );

    for task in &batch.tasks {
        let outcome = worker::convert(task, config, &ledger);
        summary.record(outcome);
    }

    info!(
        attempted = summary.attempted,
        converted = summary.converted,
        skipped_existing = summary.skipped_existing,
        transcode_failed = summary.transcode_failed,
        validation_failed = summary.validation_failed,
        spawn_failed = summary.spawn_failed,
        "Batch run complete"
    );

    Ok(summary)
}
