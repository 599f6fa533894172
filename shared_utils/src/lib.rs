//! Shared utilities for the vid-remux batch pipeline:
//! - Logging setup (file + console mirror)
//! - Batch file collection with a size-bounded cutoff
//! - Disk free-space guard
//! - FFprobe wrapper and output acceptance policy
//! - Manual-review ledger
//! - Timestamp preservation

pub mod collector;
pub mod config;
pub mod disk_space;
pub mod errors;
pub mod ffprobe;
pub mod ledger;
pub mod logging;
pub mod timestamps;
pub mod validate;

pub use collector::{collect, Batch, FileTask};
pub use config::BatchConfig;
pub use disk_space::{available_bytes, SpaceProbeError};
pub use errors::{RemuxError, Result};
pub use ffprobe::{inspect, FormatSection, ProbeReport, StreamEntry};
pub use ledger::ManualReviewLedger;
pub use timestamps::apply_timestamps;
pub use validate::{validate, ReasonCode, ValidationResult};
