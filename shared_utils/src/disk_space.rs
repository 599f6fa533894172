//! Free-space query for the output volume.
//!
//! The runner treats any probe failure as zero available space, so a
//! broken query aborts the run rather than letting a full disk kill
//! ffmpeg halfway through a file.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpaceProbeError {
    #[error("Free-space query failed for {path}: {source}")]
    QueryFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bytes available to unprivileged writes on the volume containing
/// `path`.
pub fn available_bytes(path: &Path) -> Result<u64, SpaceProbeError> {
    fs2::available_space(path).map_err(|source| SpaceProbeError::QueryFailed {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_available_bytes_on_temp_dir() {
        let temp = TempDir::new().unwrap();
        let available = available_bytes(temp.path()).unwrap();
        assert!(available > 0);
    }

    #[test]
    fn test_available_bytes_missing_path() {
        let result = available_bytes(Path::new("/nonexistent/path/for/space/query"));
        assert!(result.is_err());
    }
}
