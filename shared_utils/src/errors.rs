use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the pipeline. The fatal-precondition variants
/// abort the whole run from the runner; the per-file variants are
/// constructed by the worker and folded into its outcome, never
/// escaping the per-file boundary.
#[derive(Error, Debug)]
pub enum RemuxError {
    #[error("Target directory does not exist: {}", .0.display())]
    TargetDirMissing(PathBuf),

    #[error("Insufficient disk space on output volume: {available} bytes available, {required} required")]
    InsufficientSpace { available: u64, required: u64 },

    #[error("Transcoder exited with {code:?}: {stderr}")]
    TranscodeFailed { code: Option<i32>, stderr: String },

    #[error("Failed to launch external tool '{tool}': {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RemuxError>;
