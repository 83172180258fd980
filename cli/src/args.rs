//! Command-line arguments for `tile-cutter`.
//!
//! Every option can also come from a `TILE_CUTTER_*` environment variable; flags given on the
//! command line win.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use cutter_core::CompressOptions;
use cutter_core::log::{FileSink, LogLevel};
use cutter_core::settings::DEFAULT_TILE_HEIGHT;

/// Cut tall images into fixed-height tiles.
#[derive(Parser, Debug)]
#[command(name = "tile-cutter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Console verbosity: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write rolling log files into this directory.
    #[arg(long, env = "TILE_CUTTER_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Also write rolling log files into the per-user data directory.
    #[arg(long, env = "TILE_CUTTER_LOG_FILE", global = true, conflicts_with = "log_dir")]
    pub log_file: bool,
}

impl Cli {
    /// File sink requested by `--log-dir` or `--log-file`, if any.
    pub fn file_sink(&self) -> Option<FileSink> {
        match &self.log_dir {
            Some(dir) => Some(FileSink::new(dir)),
            None if self.log_file => Some(FileSink::in_default_directory()),
            None => None,
        }
    }

    pub fn console_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::WARN,
            1 => LogLevel::INFO,
            2 => LogLevel::DEBUG,
            _ => LogLevel::TRACE,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the dimensions of an image and how many tiles it would produce.
    Info {
        file: PathBuf,

        /// Tile height in pixels.
        #[arg(long, default_value_t = DEFAULT_TILE_HEIGHT, env = "TILE_CUTTER_HEIGHT",
              value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
    },

    /// Cut one image.
    Cut {
        file: PathBuf,

        #[command(flatten)]
        options: CutOptions,
    },

    /// Cut several images with one shared tile size. Directories expand to their JPEG and PNG
    /// files in natural name order.
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: CutOptions,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CutOptions {
    /// Tile width in pixels. Defaults to the width of each source.
    #[arg(long, env = "TILE_CUTTER_WIDTH", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_HEIGHT, env = "TILE_CUTTER_HEIGHT",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Produce at most this many tiles per source.
    #[arg(long, env = "TILE_CUTTER_COUNT", value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Directory the tiles are written to.
    #[arg(short, long, default_value = ".", env = "TILE_CUTTER_OUT")]
    pub out: PathBuf,

    /// Write one zip archive instead of one file per tile.
    #[arg(long, env = "TILE_CUTTER_ARCHIVE")]
    pub archive: bool,

    /// Recompress tiles into size-bounded JPEGs instead of lossless PNGs.
    #[arg(long, env = "TILE_CUTTER_COMPRESS")]
    pub compress: bool,

    /// Target size of each compressed tile in megabytes.
    #[arg(long, default_value_t = 1.0, env = "TILE_CUTTER_MAX_SIZE_MB",
          value_parser = positive_megabytes)]
    pub max_size_mb: f64,

    /// Longest side of a compressed tile in pixels.
    #[arg(long, default_value_t = 1920, env = "TILE_CUTTER_MAX_DIMENSION",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_dimension: u32,

    /// Starting JPEG quality for compression.
    #[arg(long, default_value_t = 92, env = "TILE_CUTTER_QUALITY",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Print session statistics as JSON when done.
    #[arg(long, env = "TILE_CUTTER_STATS")]
    pub stats: bool,
}

impl CutOptions {
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_size_mb: self.max_size_mb,
            max_width_or_height: self.max_dimension,
            initial_quality: self.quality,
            ..CompressOptions::default()
        }
    }
}

fn positive_megabytes(text: &str) -> Result<f64, String> {
    let value: f64 = text.parse().map_err(|_| format!("`{text}` is not a number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("`{text}` must be a positive size"))
    }
}
