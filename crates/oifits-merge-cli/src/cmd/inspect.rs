//! Implementation of `oifits-merge inspect <file>`.
//!
//! Parses an OIFITS JSON file and prints summary statistics to stdout:
//! - standard revision (OIFITS1 / OIFITS2)
//! - target count
//! - wavelength / array / corr table counts
//! - data table count and row count, by kind
//! - history line count
//!
//! In `--format json` mode a single JSON object is emitted to stdout.
//! In human mode, aligned key/value lines are printed.
//!
//! Exit codes: 0 = success, 2 = parse failure.
use std::collections::BTreeMap;

use oifits_merge_core::{OIDataKind, OIFitsFile};

use crate::PathOrStdin;
use crate::OutputFormat;
use crate::error::CliError;
use crate::io::read_and_parse;

/// Statistics gathered from a parsed [`OIFitsFile`].
pub struct InspectStats {
    /// OIFITS standard revision, as its `Display` string (e.g. `"OIFITS2"`).
    pub standard: String,
    /// Number of distinct targets, or 0 if there is no target table.
    pub target_count: usize,
    /// Number of `OI_WAVELENGTH` tables.
    pub wavelength_table_count: usize,
    /// Number of `OI_ARRAY` tables.
    pub array_table_count: usize,
    /// Number of `OI_CORR` tables.
    pub corr_table_count: usize,
    /// Number of data tables, grouped by kind (`"vis"`, `"vis2"`, `"t3"`, `"flux"`).
    pub data_table_counts: BTreeMap<String, usize>,
    /// Total row count across all data tables.
    pub row_count: usize,
    /// Number of history lines in the primary header.
    pub history_count: usize,
}

impl InspectStats {
    /// Computes statistics from a parsed [`OIFitsFile`].
    pub fn from_file(file: &OIFitsFile) -> Self {
        let mut data_table_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut row_count = 0;
        for table in &file.data_tables {
            *data_table_counts
                .entry(data_kind_to_str(table.kind).to_owned())
                .or_insert(0) += 1;
            row_count += table.row_count();
        }

        Self {
            standard: file.standard.to_string(),
            target_count: file
                .target_table
                .as_ref()
                .map_or(0, |t| t.rows.len()),
            wavelength_table_count: file.wavelength_tables.len(),
            array_table_count: file.array_tables.len(),
            corr_table_count: file.corr_tables.len(),
            data_table_counts,
            row_count,
            history_count: file.primary_header.history.len(),
        }
    }
}

/// Runs the `inspect` command.
///
/// Reads `source` as OIFITS JSON, computes statistics, and writes them to
/// stdout in the requested format.
///
/// # Errors
///
/// Returns [`CliError`] with exit code 2 if `source` cannot be read or parsed.
pub fn run(source: &PathOrStdin, max_file_size: u64, format: &OutputFormat) -> Result<(), CliError> {
    let file = read_and_parse(source, max_file_size)?;
    let stats = InspectStats::from_file(&file);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Human => print_human(&mut out, &stats),
        OutputFormat::Json => print_json(&mut out, &stats),
    }
    .map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}

/// Writes inspect statistics in human-readable aligned format.
fn print_human<W: std::io::Write>(w: &mut W, stats: &InspectStats) -> std::io::Result<()> {
    writeln!(w, "standard:   {}", stats.standard)?;
    writeln!(w, "targets:    {}", stats.target_count)?;
    writeln!(w, "wavelength: {}", stats.wavelength_table_count)?;
    writeln!(w, "array:      {}", stats.array_table_count)?;
    writeln!(w, "corr:       {}", stats.corr_table_count)?;
    writeln!(w, "history:    {}", stats.history_count)?;
    writeln!(w, "data rows:  {}", stats.row_count)?;
    for (kind, count) in &stats.data_table_counts {
        writeln!(w, "  {kind}: {count}")?;
    }
    Ok(())
}

/// Writes inspect statistics as a single JSON object to stdout.
fn print_json<W: std::io::Write>(w: &mut W, stats: &InspectStats) -> std::io::Result<()> {
    let mut obj = serde_json::Map::new();

    obj.insert(
        "standard".to_owned(),
        serde_json::Value::String(stats.standard.clone()),
    );
    obj.insert(
        "target_count".to_owned(),
        serde_json::Value::Number(stats.target_count.into()),
    );
    obj.insert(
        "wavelength_table_count".to_owned(),
        serde_json::Value::Number(stats.wavelength_table_count.into()),
    );
    obj.insert(
        "array_table_count".to_owned(),
        serde_json::Value::Number(stats.array_table_count.into()),
    );
    obj.insert(
        "corr_table_count".to_owned(),
        serde_json::Value::Number(stats.corr_table_count.into()),
    );
    obj.insert(
        "history_count".to_owned(),
        serde_json::Value::Number(stats.history_count.into()),
    );
    obj.insert(
        "row_count".to_owned(),
        serde_json::Value::Number(stats.row_count.into()),
    );

    let data_table_counts_obj: serde_json::Map<String, serde_json::Value> = stats
        .data_table_counts
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::Number((*v).into())))
        .collect();
    obj.insert(
        "data_table_counts".to_owned(),
        serde_json::Value::Object(data_table_counts_obj),
    );

    let json = serde_json::to_string_pretty(&serde_json::Value::Object(obj))
        .map_err(|e| std::io::Error::other(e))?;
    writeln!(w, "{json}")
}

/// Returns the lowercase keyword for a [`OIDataKind`].
fn data_kind_to_str(kind: OIDataKind) -> &'static str {
    match kind {
        OIDataKind::Vis => "vis",
        OIDataKind::Vis2 => "vis2",
        OIDataKind::T3 => "t3",
        OIDataKind::Flux => "flux",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use oifits_merge_core::{OIDataRow, OIDataTable, OIFitsStandard, OIPrimaryHDU};

    use super::*;

    fn sample_file() -> OIFitsFile {
        let mut header = OIPrimaryHDU::new();
        header.history.push("line one".to_owned());
        OIFitsFile {
            standard: OIFitsStandard::V2,
            primary_header: header,
            target_table: None,
            wavelength_tables: vec![],
            array_tables: vec![],
            corr_tables: vec![],
            data_tables: vec![OIDataTable {
                kind: OIDataKind::Vis2,
                ins_name: "SPECTRO".to_owned(),
                arr_name: None,
                corr_name: None,
                rows: vec![OIDataRow {
                    target_id: 1,
                    night_id: 1,
                    mjd: 59000.0,
                    sta_index: vec![1, 2],
                }],
            }],
        }
    }

    #[test]
    fn stats_report_standard_and_row_count() {
        let stats = InspectStats::from_file(&sample_file());
        assert_eq!(stats.standard, "OIFITS2");
        assert_eq!(stats.row_count, 1);
        assert_eq!(stats.data_table_counts.get("vis2"), Some(&1));
        assert_eq!(stats.history_count, 1);
    }

    #[test]
    fn human_output_contains_standard() {
        let stats = InspectStats::from_file(&sample_file());
        let mut buf: Vec<u8> = Vec::new();
        print_human(&mut buf, &stats).expect("write");
        let s = String::from_utf8(buf).expect("utf8");
        assert!(s.contains("OIFITS2"), "output: {s}");
    }

    #[test]
    fn json_output_is_valid_object() {
        let stats = InspectStats::from_file(&sample_file());
        let mut buf: Vec<u8> = Vec::new();
        print_json(&mut buf, &stats).expect("write");
        let s = String::from_utf8(buf).expect("utf8");
        let value: serde_json::Value = serde_json::from_str(&s).expect("valid json");
        assert_eq!(value["standard"], "OIFITS2");
    }
}
