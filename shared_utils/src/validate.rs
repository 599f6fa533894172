//! Acceptance policy for converted outputs.
//!
//! Fixed predicate set over the probe report: mp4 container, an
//! h264/avc1 video stream, an aac/mp4a audio stream, at least two
//! streams, a positive finite duration, and (when configured) an
//! output size within tolerance of the source. A missing or
//! unparseable report fails immediately without evaluating the rest.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::ffprobe::ProbeReport;

/// Stable wire codes for the manual-review ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    MissingFormatOrStreams,
    ContainerNotMp4,
    VideoStreamNotH264Avc1,
    AudioStreamNotAacMp4a,
    NbStreamsLt2,
    DurationInvalid,
    SizeDeltaExceeded,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::MissingFormatOrStreams => "missing_format_or_streams",
            ReasonCode::ContainerNotMp4 => "container_not_mp4",
            ReasonCode::VideoStreamNotH264Avc1 => "video_stream_not_h264_avc1",
            ReasonCode::AudioStreamNotAacMp4a => "audio_stream_not_aac_mp4a",
            ReasonCode::NbStreamsLt2 => "nb_streams_lt_2",
            ReasonCode::DurationInvalid => "duration_invalid",
            ReasonCode::SizeDeltaExceeded => "size_delta_exceeded",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub failed: Vec<ReasonCode>,
    /// Observed values for the operator (codec names, stream count,
    /// parsed duration, sizes).
    pub details: BTreeMap<&'static str, String>,
}

impl ValidationResult {
    fn fail_all(reason: ReasonCode) -> Self {
        Self {
            ok: false,
            failed: vec![reason],
            details: BTreeMap::new(),
        }
    }

    /// Comma-joined reason codes for the ledger line.
    pub fn joined_reasons(&self) -> String {
        self.failed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn stream_matches(stream: &crate::ffprobe::StreamEntry, kind: &str, codec: &str, tag: &str) -> bool {
    stream.codec_type.as_deref() == Some(kind)
        && stream.codec_name.as_deref() == Some(codec)
        && stream
            .codec_tag_string
            .as_deref()
            .is_some_and(|t| t.contains(tag))
}

/// Evaluate the acceptance predicates.
///
/// `original_size` and `max_size_delta` both present enables the size
/// check: `|output_size - original_size| <= max_size_delta` passes.
pub fn validate(
    report: Option<&ProbeReport>,
    output_size: u64,
    original_size: Option<u64>,
    max_size_delta: Option<u64>,
) -> ValidationResult {
    let Some(report) = report else {
        return ValidationResult::fail_all(ReasonCode::MissingFormatOrStreams);
    };
    let (Some(format), Some(streams)) = (report.format.as_ref(), report.streams.as_ref()) else {
        return ValidationResult::fail_all(ReasonCode::MissingFormatOrStreams);
    };

    let mut failed = Vec::new();
    let mut details: BTreeMap<&'static str, String> = BTreeMap::new();

    let format_name = format.format_name.as_deref().unwrap_or("");
    details.insert("format_name", format_name.to_string());
    if !format_name.contains("mp4") {
        failed.push(ReasonCode::ContainerNotMp4);
    }

    if !streams
        .iter()
        .any(|s| stream_matches(s, "video", "h264", "avc1"))
    {
        failed.push(ReasonCode::VideoStreamNotH264Avc1);
    }

    if !streams
        .iter()
        .any(|s| stream_matches(s, "audio", "aac", "mp4a"))
    {
        failed.push(ReasonCode::AudioStreamNotAacMp4a);
    }

    let nb_streams = format.nb_streams.unwrap_or(streams.len() as u32);
    details.insert("nb_streams", nb_streams.to_string());
    if nb_streams < 2 {
        failed.push(ReasonCode::NbStreamsLt2);
    }

    let duration = format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite());
    details.insert(
        "duration",
        duration.map_or_else(|| "unparseable".to_string(), |d| format!("{:.3}", d)),
    );
    if !duration.is_some_and(|d| d > 0.0) {
        failed.push(ReasonCode::DurationInvalid);
    }

    details.insert("output_size", output_size.to_string());
    if let (Some(original), Some(max_delta)) = (original_size, max_size_delta) {
        let delta = output_size.abs_diff(original);
        details.insert("original_size", original.to_string());
        details.insert("size_delta", delta.to_string());
        if delta > max_delta {
            failed.push(ReasonCode::SizeDeltaExceeded);
        }
    }

    ValidationResult {
        ok: failed.is_empty(),
        failed,
        details,
    }
}
