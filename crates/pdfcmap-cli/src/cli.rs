use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pdfcmap_core::LoadOptions;

/// Inspect, decode and re-serialize PDF CMaps.
#[derive(Debug, Parser)]
#[command(name = "pdfcmap", about, version)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a CMap file and print its summary
    Info {
        /// Path to the CMap file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Treat the CMap as belonging to a simple (single-byte) font
        #[arg(long)]
        simple: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Decode hex-encoded bytes through a CMap
    Decode {
        /// Path to the CMap file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Encoded bytes as hex (e.g. '0041 8140' or '<00418140>')
        #[arg(long)]
        hex: String,

        /// Treat the CMap as belonging to a simple (single-byte) font
        #[arg(long)]
        simple: bool,

        /// Directory of predefined CMaps used to resolve usecmap
        #[arg(long, value_name = "DIR")]
        assets: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Load a predefined CMap by name, resolving usecmap
    Predefined {
        /// CMap name (e.g. 'UniGB-UCS2-H')
        #[arg(value_name = "NAME")]
        name: String,

        /// Directory of predefined CMaps
        #[arg(long, value_name = "DIR")]
        assets: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Print the canonical ToUnicode CMap for a CMap file
    Tounicode {
        /// Path to the CMap file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

/// Output format for all subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

/// Resource limits applied while parsing.
#[derive(Debug, Clone, Args)]
pub struct LimitArgs {
    /// Reject CMap files larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_input_bytes: Option<usize>,

    /// Maximum number of codes a single range entry may cover
    #[arg(long, default_value_t = LoadOptions::default().max_range_len)]
    pub max_range_len: u32,

    /// Maximum number of entries in one mapping table
    #[arg(long, default_value_t = LoadOptions::default().max_mappings)]
    pub max_mappings: usize,

    /// Maximum depth of nested usecmap references
    #[arg(long, default_value_t = LoadOptions::default().max_usecmap_depth)]
    pub max_usecmap_depth: usize,
}

impl LimitArgs {
    /// Convert to the core library's `LoadOptions`.
    pub fn to_load_options(&self) -> LoadOptions {
        LoadOptions {
            max_input_bytes: self.max_input_bytes,
            max_range_len: self.max_range_len,
            max_mappings: self.max_mappings,
            max_usecmap_depth: self.max_usecmap_depth,
        }
    }
}
