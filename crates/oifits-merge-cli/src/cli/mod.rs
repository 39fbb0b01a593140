//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].  This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits plain text to stdout. `Json` emits a single structured
/// JSON object (the merged file itself for `merge`, a stats object for
/// `inspect`).
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, aligned text output (default).
    Human,
    /// Structured JSON output.
    Json,
}

/// All top-level subcommands exposed by the `oifits-merge` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Merge two or more OIFITS files (given as their JSON model
    /// representation) into a single output file.
    Merge {
        /// Paths to OIFITS JSON files, or `-` for stdin (at most one may be `-`).
        #[arg(value_name = "FILE", num_args = 1..)]
        files: Vec<PathOrStdin>,

        /// Restrict the output to these targets by name (repeatable). When
        /// omitted, every target is retained.
        #[arg(long, value_name = "NAME")]
        target: Vec<String>,

        /// Restrict the output to these instrument modes by `INSNAME`
        /// (repeatable). When omitted, every instrument mode is retained.
        #[arg(long, value_name = "INSNAME")]
        instrument_mode: Vec<String>,

        /// Restrict the output to these night identifiers (repeatable).
        /// When omitted, every night is retained.
        #[arg(long, value_name = "NIGHT_ID")]
        night: Vec<i32>,

        /// Restrict the output to an MJD range `LO:HI` (repeatable, closed
        /// interval, union of all given ranges). When omitted, every MJD is
        /// retained.
        #[arg(long, value_name = "LO:HI")]
        mjd_range: Vec<String>,

        /// Restrict the output to a wavelength range in meters `LO:HI`
        /// (repeatable, closed interval, union of all given ranges). When
        /// omitted, every channel is retained.
        #[arg(long, value_name = "LO:HI")]
        wavelength_range: Vec<String>,

        /// Restrict the output to a baseline, given as comma-separated
        /// station indices, e.g. `1,2` (repeatable, order-independent).
        /// When omitted, every baseline is retained.
        #[arg(long, value_name = "A,B[,C]")]
        baseline: Vec<String>,
    },

    /// Print summary statistics for a merged (or single) OIFITS file.
    Inspect {
        /// Path to an OIFITS JSON file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
    },

    /// Scaffold a new minimal OIFITS JSON file.
    Init {
        /// Generate a realistic example file instead of a minimal skeleton.
        #[arg(long)]
        example: bool,
    },
}

/// Root CLI struct for the `oifits-merge` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "oifits-merge",
    version,
    about = "OIFITS merge reference CLI",
    long_about = "Deterministic merger for optical interferometry data files (OIFITS).\n\
                  Merges, inspects, and scaffolds OIFITS files expressed in their\n\
                  JSON in-memory model."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity: timing and file metadata (incompatible
    /// with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `OIFITS_MERGE_MAX_FILE_SIZE` environment
    /// variable. The CLI flag takes precedence over the environment
    /// variable. Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "OIFITS_MERGE_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}
