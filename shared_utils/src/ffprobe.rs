//! FFprobe wrapper.
//!
//! Invokes the external probe with a JSON metadata dump and
//! deserializes the parts the validator cares about. Everything is
//! optional at the type level; the validator decides what a missing
//! section means.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::error;

/// Top-level ffprobe document: `format` plus the stream list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    pub format: Option<FormatSection>,
    pub streams: Option<Vec<StreamEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatSection {
    pub format_name: Option<String>,
    pub nb_streams: Option<u32>,
    /// ffprobe emits duration and size as strings.
    pub duration: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamEntry {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub codec_tag_string: Option<String>,
}

impl ProbeReport {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Probe `path` with the external tool. Any failure — spawn, non-zero
/// exit, unparseable output — is logged and collapses to `None`; the
/// caller treats that as a validation failure for this file, never a
/// batch abort.
pub fn inspect(ffprobe_path: &str, path: &Path) -> Option<ProbeReport> {
    let output = match Command::new(ffprobe_path)
        .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams", "--"])
        .arg(path)
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            error!(
                tool = ffprobe_path,
                path = %path.display(),
                error = %e,
                "Failed to launch metadata probe"
            );
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(
            path = %path.display(),
            exit_code = ?output.status.code(),
            stderr = %stderr.trim(),
            "Metadata probe failed"
        );
        return None;
    }

    let json = String::from_utf8_lossy(&output.stdout);
    match ProbeReport::parse(&json) {
        Ok(report) => Some(report),
        Err(e) => {
            error!(
                path = %path.display(),
                error = %e,
                "Failed to parse metadata probe output"
            );
            None
        }
    }
}
