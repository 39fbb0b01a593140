//! Implementation of `oifits-merge init`.
//!
//! Generates a minimal valid OIFITS JSON file and writes it to stdout.
//!
//! Flags:
//! - `--example`: generate a realistic example file with sample targets,
//!   wavelength table, and a VIS2 data table instead of the empty skeleton.
//!
//! Exit codes: 0 = always succeeds unless stdout write fails.
use oifits_merge_core::{
    InstrumentMode, OIArray, OIDataKind, OIDataRow, OIDataTable, OIFitsStandard, OIFitsFile,
    OIPrimaryHDU, OITarget, OIWavelength, Range, StationEntry, Target, TargetRow,
};

use crate::error::CliError;

/// Runs the `init` command.
///
/// Prints a valid OIFITS JSON file to stdout. When `example` is `true`,
/// realistic sample content is included; otherwise only an empty skeleton
/// is emitted.
///
/// # Errors
///
/// Returns [`CliError::InternalError`] if the generated file cannot be
/// serialized, or [`CliError::IoError`] if stdout cannot be written.
pub fn run(example: bool) -> Result<(), CliError> {
    let file = if example {
        build_example_file()
    } else {
        OIFitsFile::empty(OIFitsStandard::V2)
    };

    let json = serde_json::to_string_pretty(&file).map_err(|e| CliError::InternalError {
        detail: format!("JSON serialization failed: {e}"),
    })?;

    println!("{json}");
    Ok(())
}

/// Builds a realistic example [`OIFitsFile`] with one target, one
/// instrument, one array, and a VIS2 data table connecting them.
fn build_example_file() -> OIFitsFile {
    let mut header = OIPrimaryHDU::new();
    header.set("CONTENT", "OIFITS2");
    header.set("TELESCOP", "VLTI");
    header.set("INSTRUME", "GRAVITY");
    header.set("OBSERVER", "EXAMPLE_OBS");
    header.set("OBJECT", "Vega");

    let target_table = OITarget::new(vec![TargetRow {
        target_id: 1,
        target: Target {
            name: "Vega".to_owned(),
            ra_deg: 279.234_735,
            dec_deg: 38.783_689,
        },
    }]);

    let wavelength_table = OIWavelength {
        ins_name: "GRAVITY_SC".to_owned(),
        eff_wave: vec![2.0e-6, 2.1e-6, 2.2e-6],
        instrument_mode: InstrumentMode {
            wavelength_range: Range::new(2.0e-6, 2.2e-6),
        },
    };

    let array_table = OIArray {
        arr_name: "VLTI".to_owned(),
        stations: vec![
            StationEntry {
                name: "A0".to_owned(),
                sta_index: 1,
            },
            StationEntry {
                name: "B2".to_owned(),
                sta_index: 2,
            },
        ],
    };

    let data_table = OIDataTable {
        kind: OIDataKind::Vis2,
        ins_name: "GRAVITY_SC".to_owned(),
        arr_name: Some("VLTI".to_owned()),
        corr_name: None,
        rows: vec![OIDataRow {
            target_id: 1,
            night_id: 1,
            mjd: 59_945.123,
            sta_index: vec![1, 2],
        }],
    };

    OIFitsFile {
        standard: OIFitsStandard::V2,
        primary_header: header,
        target_table: Some(target_table),
        wavelength_tables: vec![wavelength_table],
        array_tables: vec![array_table],
        corr_tables: vec![],
        data_tables: vec![data_table],
    }
}
