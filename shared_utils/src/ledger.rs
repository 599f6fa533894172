//! Manual-review ledger.
//!
//! Durable list of files that failed acceptance and need a human
//! look. Plain text, one line per failure, written by the single
//! sequential worker — no locking needed under the serial model.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct ManualReviewLedger {
    path: PathBuf,
}

impl ManualReviewLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the ledger (start of a run with `reset_ledger`).
    pub fn reset(&self) -> Result<()> {
        std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to reset ledger: {}", self.path.display()))?;
        Ok(())
    }

    /// Append one failure line: timestamp, source path, comma-joined
    /// reason codes. Best-effort — a ledger write failure is logged,
    /// never escalated, so it cannot take down the batch.
    pub fn append(&self, source: &Path, joined_reasons: &str) {
        let line = format!(
            "[{}] {} :: {}",
            chrono::Local::now().to_rfc3339(),
            source.display(),
            joined_reasons
        );
        if let Err(e) = self.append_line(&line) {
            warn!(
                ledger = %self.path.display(),
                error = %e,
                "Failed to write manual-review ledger entry"
            );
        }
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger: {}", self.path.display()))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
