//! Synthetic OIFITS file generator.
//!
//! Produces valid [`OIFitsFile`] instances with realistic target, instrument,
//! and array topology for benchmarking and property-based testing of
//! `oifits-merge-core`.

use oifits_merge_core::{
    InstrumentMode, OIArray, OIDataKind, OIDataRow, OIDataTable, OIFitsFile, OIFitsStandard,
    OIPrimaryHDU, OITarget, OIWavelength, Range, StationEntry, Target, TargetRow,
};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

const TARGET_NAMES: &[&str] = &[
    "Vega", "Altair", "Betelgeuse", "Rigel", "Aldebaran", "Antares", "Sirius", "Procyon",
    "Capella", "Arcturus", "Spica", "Pollux", "Deneb", "Regulus", "Fomalhaut", "Achernar",
];

const INSTRUMENT_NAMES: &[&str] = &[
    "GRAVITY_SC",
    "GRAVITY_FT",
    "PIONIER",
    "MATISSE_L",
    "MATISSE_N",
    "AMBER",
];

const ARRAY_NAMES: &[&str] = &["VLTI", "CHARA", "NPOI"];

const DATA_KINDS: &[OIDataKind] = &[
    OIDataKind::Vis,
    OIDataKind::Vis2,
    OIDataKind::T3,
    OIDataKind::Flux,
];

/// Configuration for the synthetic file generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of targets in the `OI_TARGET` table.
    pub num_targets: usize,
    /// Number of `OI_WAVELENGTH` tables (one instrument mode each).
    pub num_instrument_modes: usize,
    /// Number of `OI_ARRAY` tables.
    pub num_arrays: usize,
    /// Number of data tables (`OI_VIS`/`OI_VIS2`/`OI_T3`/`OI_FLUX`).
    pub num_data_tables: usize,
    /// Number of rows per data table.
    pub rows_per_table: usize,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~5 targets, ~3 data tables, ~300 rows total.
    Small,
    /// ~20 targets, ~12 data tables, ~6000 rows total.
    Medium,
    /// ~80 targets, ~30 data tables, ~60000 rows total.
    Large,
    /// ~200 targets, ~60 data tables, ~300000 rows total.
    XLarge,
}

impl SizeTier {
    /// Returns the default [`GeneratorConfig`] for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_targets: 5,
                num_instrument_modes: 2,
                num_arrays: 1,
                num_data_tables: 3,
                rows_per_table: 100,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_targets: 20,
                num_instrument_modes: 4,
                num_arrays: 2,
                num_data_tables: 12,
                rows_per_table: 500,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_targets: 80,
                num_instrument_modes: 6,
                num_arrays: 3,
                num_data_tables: 30,
                rows_per_table: 2_000,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                num_targets: 200,
                num_instrument_modes: 6,
                num_arrays: 3,
                num_data_tables: 60,
                rows_per_table: 5_000,
            },
        }
    }
}

/// Generates a synthetic [`OIFitsFile`] from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_oifits(config: &GeneratorConfig) -> OIFitsFile {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut header = OIPrimaryHDU::new();
    header.set("CONTENT", "OIFITS2");
    header.set("TELESCOP", "VLTI");

    let rows: Vec<TargetRow> = (0..config.num_targets)
        .map(|i| TargetRow {
            target_id: i as i32 + 1,
            target: Target {
                name: format!(
                    "{}-{i}",
                    TARGET_NAMES[i % TARGET_NAMES.len()]
                ),
                ra_deg: rng.gen_range(0.0..360.0),
                dec_deg: rng.gen_range(-90.0..90.0),
            },
        })
        .collect();
    let target_ids: Vec<i32> = rows.iter().map(|r| r.target_id).collect();
    let target_table = OITarget::new(rows);

    let wavelength_tables: Vec<OIWavelength> = (0..config.num_instrument_modes)
        .map(|i| {
            let lo = rng.gen_range(0.5e-6..2.0e-6);
            let hi = lo + rng.gen_range(0.1e-6..0.5e-6);
            let channels = rng.gen_range(3..16);
            OIWavelength {
                ins_name: format!("{}-{i}", INSTRUMENT_NAMES[i % INSTRUMENT_NAMES.len()]),
                eff_wave: (0..channels)
                    .map(|c| lo + (hi - lo) * (c as f64 / channels as f64))
                    .collect(),
                instrument_mode: InstrumentMode {
                    wavelength_range: Range::new(lo, hi),
                },
            }
        })
        .collect();
    let ins_names: Vec<String> = wavelength_tables.iter().map(|w| w.ins_name.clone()).collect();

    let array_tables: Vec<OIArray> = (0..config.num_arrays)
        .map(|i| {
            let num_stations = rng.gen_range(2..8);
            OIArray {
                arr_name: format!("{}-{i}", ARRAY_NAMES[i % ARRAY_NAMES.len()]),
                stations: (0..num_stations)
                    .map(|s| StationEntry {
                        name: format!("S{s}"),
                        sta_index: s as i16 + 1,
                    })
                    .collect(),
            }
        })
        .collect();
    let arr_names: Vec<String> = array_tables.iter().map(|a| a.arr_name.clone()).collect();

    let data_tables: Vec<OIDataTable> = (0..config.num_data_tables)
        .map(|i| {
            let arr = &array_tables[i % array_tables.len().max(1)];
            let station_indices: Vec<i16> = arr.stations.iter().map(|s| s.sta_index).collect();
            let rows: Vec<OIDataRow> = (0..config.rows_per_table)
                .map(|_| {
                    let a = station_indices[rng.gen_range(0..station_indices.len())];
                    let mut b = station_indices[rng.gen_range(0..station_indices.len())];
                    if station_indices.len() > 1 {
                        while b == a {
                            b = station_indices[rng.gen_range(0..station_indices.len())];
                        }
                    }
                    OIDataRow {
                        target_id: target_ids[rng.gen_range(0..target_ids.len())],
                        night_id: rng.gen_range(1..30),
                        mjd: rng.gen_range(59_000.0..60_000.0),
                        sta_index: vec![a, b],
                    }
                })
                .collect();
            OIDataTable {
                kind: DATA_KINDS[i % DATA_KINDS.len()],
                ins_name: ins_names[i % ins_names.len().max(1)].clone(),
                arr_name: Some(arr.arr_name.clone()),
                corr_name: None,
                rows,
            }
        })
        .collect();

    OIFitsFile {
        standard: OIFitsStandard::V2,
        primary_header: header,
        target_table: Some(target_table),
        wavelength_tables,
        array_tables,
        corr_tables: vec![],
        data_tables,
    }
}
