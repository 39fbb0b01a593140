//! Implementation of `oifits-merge merge <file>...`.
//!
//! Reads two or more OIFITS JSON files, runs the merge pipeline, and writes
//! the merged file to stdout. Warnings go to stderr.
//!
//! Exit codes:
//! - 0 = success
//! - 1 = the merge pipeline rejected its inputs (e.g. no files supplied)
//! - 2 = parse failure on any input file, or an invalid selector flag
use std::io::Write as _;

use oifits_merge_core::{SelectorResult, merge};

use crate::PathOrStdin;
use crate::OutputFormat;
use crate::cmd::selectors::build_selector;
use crate::error::CliError;
use crate::format::{self, FormatMode, FormatterConfig};
use crate::io::read_and_parse;

/// Runs the `merge` command.
///
/// Reads each path in `files`, builds a [`SelectorResult`] from the selector
/// flags, runs the merge pipeline, and writes the merged output to stdout as
/// pretty-printed JSON. Warnings are written to stderr in `format`, honoring
/// `quiet` and `no_color`.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] — any input file is not valid OIFITS JSON.
/// - [`CliError::InvalidArgument`] — a selector flag is malformed.
/// - [`CliError::MergeFailed`] — the merge pipeline rejected its inputs.
#[allow(clippy::too_many_arguments)]
pub fn run(
    files: &[PathOrStdin],
    targets: &[String],
    instrument_modes: &[String],
    nights: &[i32],
    mjd_ranges: &[String],
    wavelength_ranges: &[String],
    baselines: &[String],
    max_file_size: u64,
    format: &OutputFormat,
    quiet: bool,
    no_color: bool,
) -> Result<(), CliError> {
    let selector = build_selector(
        targets,
        instrument_modes,
        nights,
        mjd_ranges,
        wavelength_ranges,
        baselines,
    )?;

    let mut parsed = Vec::with_capacity(files.len());
    for source in files {
        parsed.push(read_and_parse(source, max_file_size)?);
    }

    let output = merge(&parsed, Some(&SelectorResult::new(selector))).map_err(|e| {
        CliError::MergeFailed {
            detail: e.to_string(),
        }
    })?;

    let mode = match format {
        OutputFormat::Human => FormatMode::Human,
        OutputFormat::Json => FormatMode::Json,
    };
    let formatter_config = FormatterConfig::from_flags(no_color, quiet);

    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    for warning in &output.warnings {
        format::write_warning(&mut err_out, warning, mode, &formatter_config).map_err(|e| {
            CliError::IoError {
                source: "stderr".to_owned(),
                detail: e.to_string(),
            }
        })?;
    }

    let json = serde_json::to_vec_pretty(&output.file).map_err(|e| CliError::InternalError {
        detail: format!("JSON serialization of merged output failed: {e}"),
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(&json).map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;
    out.write_all(b"\n").map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}
