// vidmorph-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use vidmorph_core::config::{MAX_COPIES, MIN_COPIES};
use vidmorph_core::{Orientation, TransformKind};

use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Vidmorph: generate visually distinct variants of uploaded videos",
    long_about = "Runs randomised ffmpeg transform chains over a directory of uploads via vidmorph-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging, including ffmpeg output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates numbered variants for every video in an input directory
    Run(RunArgs),
    /// Prints what the media inspector sees in a file, as JSON
    Probe(ProbeArgs),
    /// Applies a single catalog transform to one file
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory containing .mp4/.mov uploads
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory receiving numbered {n}.mp4 outputs
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Variants to generate per input file
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_COPIES)..=i64::from(MAX_COPIES))
    )]
    pub copies: u32,

    /// Target orientation (horizontal = 1920x1080, vertical = 1080x1920)
    #[arg(long, default_value = "horizontal", value_name = "ORIENTATION")]
    pub orientation: Orientation,

    /// Seed for reproducible transform selection
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Base directory for intermediate files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR", env = "VIDMORPH_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// ntfy topic URL for batch notifications (e.g., https://ntfy.sh/your_topic)
    #[arg(long, value_name = "TOPIC_URL", env = "VIDMORPH_NTFY_TOPIC")]
    pub ntfy: Option<String>,

    /// Detach and run in the background, logging into LOG_DIR
    #[arg(long, default_value_t = false)]
    pub daemon: bool,
}

impl RunArgs {
    #[must_use]
    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("logs"))
    }
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Transform name, e.g. speed-change, mirror, even-dimension-repair
    #[arg(short, long, value_name = "TRANSFORM")]
    pub transform: TransformKind,

    /// Source file
    #[arg(short = 'i', long = "input", required = true, value_name = "IN")]
    pub input: PathBuf,

    /// Destination file (container rewrap may change its extension)
    #[arg(short = 'o', long = "output", required = true, value_name = "OUT")]
    pub output: PathBuf,

    /// Orientation used by resolution-change and padding
    #[arg(long, default_value = "horizontal", value_name = "ORIENTATION")]
    pub orientation: Orientation,

    /// Seed for the transform's random parameters
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}
