//! Timestamp preservation.
//!
//! The converted file takes over the source's modification and access
//! times, so sort-by-date library views keep working after the
//! original is deleted. Best effort: a failure here is a warning, the
//! conversion still counts.

use filetime::FileTime;
use std::path::Path;
use tracing::warn;

/// Stamp `mtime`/`atime` (captured at collection time) onto `dst`.
/// Returns whether the stamp took, so callers can log the outcome.
pub fn apply_timestamps(dst: &Path, accessed: FileTime, modified: FileTime) -> bool {
    match filetime::set_file_times(dst, accessed, modified) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                path = %dst.display(),
                error = %e,
                "Failed to preserve timestamps on output"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_timestamps() {
        let temp = TempDir::new().unwrap();
        let dst = temp.path().join("out.mp4");
        std::fs::write(&dst, b"x").unwrap();

        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        let atime = FileTime::from_unix_time(1_600_000_100, 0);
        assert!(apply_timestamps(&dst, atime, mtime));

        let meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&meta).unix_seconds(),
            1_600_000_000
        );
    }

    #[test]
    fn test_apply_timestamps_missing_target_is_soft_failure() {
        let temp = TempDir::new().unwrap();
        let dst = temp.path().join("missing.mp4");
        let now = FileTime::now();
        assert!(!apply_timestamps(&dst, now, now));
    }
}
