//! vid-remux — batch remux of legacy `.ts`/`.flv` captures into
//! validated `.mp4`.
//!
//! All media processing is delegated to external ffmpeg/ffprobe
//! invocations; this crate only orchestrates: collect a size-bounded
//! batch, drive each file through the conversion state machine, and
//! decide cleanup from the validation verdict.
//!
//! ```rust,ignore
//! use shared_utils::BatchConfig;
//!
//! let config = BatchConfig {
//!     target_dir: "/captures".into(),
//!     output_dir: Some("/converted".into()),
//!     ..BatchConfig::default()
//! };
//! let summary = vid_remux::run(&config)?;
//! println!("attempted {}", summary.attempted);
//! ```

pub mod runner;
pub mod worker;

pub use runner::{run, Summary};
pub use worker::{convert, destination_path, Outcome};

pub use shared_utils::{BatchConfig, RemuxError, Result};
