//! Batch configuration bundle.
//!
//! One explicit struct passed into the runner at construction — no
//! process-wide state. Every knob the pipeline recognizes lives here;
//! the CLI layer fills it from flags, optionally seeded from a JSON
//! file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for one batch run.
///
/// Defaults: convert `.ts`/`.flv` in place (output next to the
/// sources), keep sources, 10 GiB batch cap, 2 GiB free-space floor,
/// log and ledger in the output directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Root of the tree to scan for convertible files.
    pub target_dir: PathBuf,
    /// Where `<stem>.mp4` outputs are written. Created if absent.
    /// `None` converts in place, alongside the sources.
    pub output_dir: Option<PathBuf>,
    /// Transcoder executable (name on PATH or absolute path).
    pub ffmpeg_path: String,
    /// Metadata probe executable.
    pub ffprobe_path: String,
    /// Append-only run log, truncated at startup.
    pub log_path: PathBuf,
    /// Manual-review ledger for validation failures.
    pub ledger_path: PathBuf,
    /// Extensions (lowercase, no dot) eligible for conversion.
    pub extensions: Vec<String>,
    /// Delete the source after a validated conversion (and on the
    /// destination-exists skip path).
    pub delete_source_on_success: bool,
    /// Abort the whole run when the output volume has less free
    /// space than this. `None` disables the check.
    pub space_threshold_bytes: Option<u64>,
    /// Hard cap on the summed size of one batch; collection halts
    /// the first time a candidate would exceed it.
    pub max_batch_bytes: u64,
    /// When set, a validated output must be within this many bytes
    /// of the source size.
    pub max_size_delta_bytes: Option<u64>,
    /// Truncate the ledger at run start instead of appending.
    pub reset_ledger: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            output_dir: None,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            log_path: PathBuf::from("vid_remux.log"),
            ledger_path: PathBuf::from("manual_review.txt"),
            extensions: vec!["ts".to_string(), "flv".to_string()],
            delete_source_on_success: false,
            space_threshold_bytes: Some(2 * 1024 * 1024 * 1024),
            max_batch_bytes: 10 * 1024 * 1024 * 1024,
            max_size_delta_bytes: None,
            reset_ledger: false,
        }
    }
}

impl BatchConfig {
    /// Load a config bundle from a JSON file. Missing keys fall back
    /// to the documented defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Output directory in effect: the configured one, or the target
    /// tree when none was given.
    pub fn resolved_output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.target_dir)
    }

    /// Extension list as `&str` slices for the collector.
    pub fn extension_refs(&self) -> Vec<&str> {
        self.extensions.iter().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.extensions, vec!["ts", "flv"]);
        assert!(config.output_dir.is_none());
        assert!(!config.delete_source_on_success);
        assert_eq!(config.max_batch_bytes, 10 * 1024 * 1024 * 1024);
        assert_eq!(config.space_threshold_bytes, Some(2 * 1024 * 1024 * 1024));
        assert!(config.max_size_delta_bytes.is_none());
    }

    #[test]
    fn test_from_json_file_partial() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "target_dir": "/videos", "delete_source_on_success": true, "max_batch_bytes": 1024 }}"#
        )
        .unwrap();

        let config = BatchConfig::from_json_file(&path).unwrap();
        assert_eq!(config.target_dir, PathBuf::from("/videos"));
        assert!(config.delete_source_on_success);
        assert_eq!(config.max_batch_bytes, 1024);
        // Unspecified keys keep their defaults
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.extensions, vec!["ts", "flv"]);
        // No output_dir in the file means in-place next to the sources
        assert!(config.output_dir.is_none());
        assert_eq!(config.resolved_output_dir(), Path::new("/videos"));
    }

    #[test]
    fn test_resolved_output_dir_fallback_and_override() {
        let mut config = BatchConfig {
            target_dir: PathBuf::from("/captures"),
            ..BatchConfig::default()
        };
        assert_eq!(config.resolved_output_dir(), Path::new("/captures"));

        config.output_dir = Some(PathBuf::from("/converted"));
        assert_eq!(config.resolved_output_dir(), Path::new("/converted"));
    }

    #[test]
    fn test_from_json_file_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(BatchConfig::from_json_file(&path).is_err());
    }
}
