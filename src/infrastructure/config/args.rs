use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal-resolver",
    version,
    about = "Resolves protected case attachments behind a citizen-service form portal",
    long_about = None
)]
pub struct CliArgs {
    /// Attachment URLs to resolve. Plain image links are passed through.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Directory resolved images are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Maximum resolutions in flight.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Cache time-to-live in seconds.
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Write the default configuration file and exit.
    #[arg(long)]
    pub write_default_config: bool,
}
