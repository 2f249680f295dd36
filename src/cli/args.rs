//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::capture::CaptureDuration;
use crate::domain::config::OutputSink;

/// MuteOne - capture compressed audio and save it as a WAV file
#[derive(Parser, Debug)]
#[command(name = "muteone")]
#[command(version)]
#[command(about = "Capture a compressed audio stream and convert it to a 16-bit PCM WAV file")]
#[command(long_about = None)]
pub struct Cli {
    /// Audio to capture: a file path, or - for standard input
    #[arg(short = 'i', long, value_name = "PATH", default_value = "-")]
    pub input: String,

    /// Bytes read per recorded chunk
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Stop automatically after this long (e.g., 30s, 1m, 2m30s)
    #[arg(short = 'd', long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Upload the recording instead of saving it locally
    #[arg(short = 'u', long)]
    pub upload: bool,

    /// Play the recording back before saving or uploading it
    #[arg(short = 'm', long)]
    pub monitor: bool,

    /// Directory for saved recordings (default: your downloads folder)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Resolved options for one capture run
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub input: String,
    pub chunk_size: usize,
    pub limit: Option<CaptureDuration>,
    pub monitor: bool,
    pub sink: OutputSink,
    pub output_dir: PathBuf,
    pub upload_url: Option<String>,
    pub follow_up_url: Option<String>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_dir",
    "upload_url",
    "follow_up_url",
    "chunk_size",
    "sink",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
