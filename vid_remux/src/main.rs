use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use shared_utils::BatchConfig;

#[derive(Parser)]
#[command(name = "vid-remux")]
#[command(version, about = "Batch remux of legacy .ts/.flv captures into validated .mp4", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree and convert one size-bounded batch
    Run {
        /// Root directory to scan for convertible files
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Output directory for .mp4 files (default: the target dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON config file; CLI flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Transcoder executable
        #[arg(long)]
        ffmpeg: Option<String>,

        /// Metadata probe executable
        #[arg(long)]
        ffprobe: Option<String>,

        /// Run log file (truncated at startup)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Manual-review ledger file
        #[arg(long)]
        ledger_file: Option<PathBuf>,

        /// Comma-separated list of convertible extensions
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Delete each source after its output validates
        #[arg(long)]
        delete_source: bool,

        /// Minimum free bytes required on the output volume
        #[arg(long)]
        space_threshold: Option<u64>,

        /// Skip the free-space precondition entirely
        #[arg(long)]
        no_space_check: bool,

        /// Byte cap for one batch; remaining files wait for the next run
        #[arg(long)]
        max_batch_bytes: Option<u64>,

        /// Reject outputs whose size differs from the source by more
        /// than this many bytes
        #[arg(long)]
        max_size_delta: Option<u64>,

        /// Truncate the manual-review ledger before the run
        #[arg(long)]
        reset_ledger: bool,
    },

    /// Probe a single file and print the acceptance verdict
    Probe {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Metadata probe executable
        #[arg(long, default_value = "ffprobe")]
        ffprobe: String,

        #[arg(short, long, default_value = "human")]
        output: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            target,
            output,
            config,
            ffmpeg,
            ffprobe,
            log_file,
            ledger_file,
            extensions,
            delete_source,
            space_threshold,
            no_space_check,
            max_batch_bytes,
            max_size_delta,
            reset_ledger,
        } => {
            let mut config = match config {
                Some(path) => BatchConfig::from_json_file(&path)?,
                None => BatchConfig::default(),
            };
            config.target_dir = target;
            if let Some(v) = output {
                config.output_dir = Some(v);
            }
            if let Some(v) = ffmpeg {
                config.ffmpeg_path = v;
            }
            if let Some(v) = ffprobe {
                config.ffprobe_path = v;
            }
            if let Some(v) = log_file {
                config.log_path = v;
            }
            if let Some(v) = ledger_file {
                config.ledger_path = v;
            }
            if let Some(v) = extensions {
                config.extensions = v;
            }
            if delete_source {
                config.delete_source_on_success = true;
            }
            if no_space_check {
                config.space_threshold_bytes = None;
            } else if let Some(v) = space_threshold {
                config.space_threshold_bytes = Some(v);
            }
            if let Some(v) = max_batch_bytes {
                config.max_batch_bytes = v;
            }
            if let Some(v) = max_size_delta {
                config.max_size_delta_bytes = Some(v);
            }
            if reset_ledger {
                config.reset_ledger = true;
            }

            let _guard = shared_utils::logging::init_logging("vid-remux", &config.log_path)?;

            for tool in [&config.ffmpeg_path, &config.ffprobe_path] {
                if which::which(tool).is_err() {
                    warn!(tool = %tool, "External tool not found on PATH");
                }
            }

            info!("🎬 Batch Remux Run");
            info!("   Target: {}", config.target_dir.display());
            info!("   Output: {}", config.resolved_output_dir().display());
            info!("   Extensions: {}", config.extensions.join(", "));
            if config.delete_source_on_success {
                info!("   🗑️  Delete source on success: ENABLED");
            }
            if let Some(threshold) = config.space_threshold_bytes {
                info!("   💾 Free-space floor: {} bytes", threshold);
            }
            info!("   📦 Batch cap: {} bytes", config.max_batch_bytes);

            let summary = vid_remux::run(&config)?;

            info!("");
            info!("✅ Done: {} file(s) attempted", summary.attempted);
        }

        Commands::Probe {
            input,
            ffprobe,
            output,
        } => {
            let report = shared_utils::inspect(&ffprobe, &input);
            let size = std::fs::metadata(&input).map(|m| m.len()).unwrap_or(0);
            let verdict = shared_utils::validate(report.as_ref(), size, None, None);

            match output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&verdict)?);
                }
                OutputFormat::Human => {
                    println!("\n📊 Acceptance Verdict");
                    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                    println!("📁 File: {}", input.display());
                    println!(
                        "{}",
                        if verdict.ok {
                            "✅ PASS: output meets the acceptance policy"
                        } else {
                            "❌ FAIL"
                        }
                    );
                    for reason in &verdict.failed {
                        println!("   ⚠️  {}", reason);
                    }
                    for (key, value) in &verdict.details {
                        println!("   {} = {}", key, value);
                    }
                    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                }
            }

            if !verdict.ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
