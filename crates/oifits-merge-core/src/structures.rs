//! The OIFITS in-memory data model: primary header, target/wavelength/array/
//! corr metadata tables, and the data tables that reference them.
//!
//! Byte-level FITS encoding is out of scope (SPEC_FULL.md §1), so these
//! structs model only the fields the merge pipeline itself reads or writes;
//! they are plain owned data, not a faithful transcription of the FITS
//! binary-table layout. Each [`OIDataTable`] references its wavelength/
//! array/corr tables *by name*, exactly as real OIFITS keywords
//! (`INSNAME`/`ARRNAME`/`CORRNAME`) do — the "identity, not content" rule in
//! SPEC_FULL.md §3.2 is about how the merge pipeline tracks those name
//! references internally (see [`crate::identity::TableHandle`]), not about
//! how the file format represents them.

use serde::{Deserialize, Serialize};

use crate::enums::OIFitsStandard;
use crate::types::{BitSet, Range};

// ---------------------------------------------------------------------------
// Primary header
// ---------------------------------------------------------------------------

/// Mandatory primary-header keywords consulted during consensus synthesis
/// (§4.3). Optional keywords and free-form cards are never propagated in the
/// multi-header synthesis case.
pub const MANDATORY_KEYWORDS: &[&str] = &[
    "CONTENT", "DATE", "ORIGIN", "TELESCOP", "INSTRUME", "OBSERVER", "OBJECT", "INSMODE",
];

/// Sentinel value written for a mandatory keyword on which the source
/// headers disagree (§4.3).
pub const VALUE_MULTI: &str = "MULTIPLE";

/// Sentinel value written for a mandatory keyword absent from every source
/// header (§4.3), and for a data table's `ARRNAME` when its array reference
/// does not resolve within its own file (§4.8 Step A).
pub const VALUE_UNDEFINED: &str = "UNDEFINED";

/// An OIFITS primary header: an ordered keyword → value map plus a history
/// log. Ordered so that keyword insertion order is preserved across a
/// verbatim copy, matching how real FITS cards are positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIPrimaryHDU {
    keywords: Vec<(String, String)>,
    pub history: Vec<String>,
}

impl OIPrimaryHDU {
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key` to `value`, updating in place if already present or
    /// appending at the end otherwise.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.keywords.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.keywords.push((key.to_owned(), value));
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for OIPrimaryHDU {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A logical target entity, identified by content (name + coordinates)
/// rather than by any particular table's local numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// One row of an [`OITarget`] table: a source-local 16-bit ID paired with
/// the logical target it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRow {
    pub target_id: i16,
    pub target: Target,
}

/// The `OI_TARGET` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OITarget {
    pub rows: Vec<TargetRow>,
}

impl OITarget {
    pub fn new(rows: Vec<TargetRow>) -> Self {
        Self { rows }
    }

    /// Every local target ID in this table that names `target`
    /// (content-equal to it), per §4.4.
    pub fn target_ids(&self, target: &Target) -> Vec<i16> {
        self.rows
            .iter()
            .filter(|r| &r.target == target)
            .map(|r| r.target_id)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Wavelength
// ---------------------------------------------------------------------------

/// The wavelength range an instrument mode covers, used to decide whether a
/// selector's wavelength ranges intersect a given `OI_WAVELENGTH` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMode {
    pub wavelength_range: Range,
}

/// The `OI_WAVELENGTH` table, keyed (for name-collision purposes) by
/// `ins_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIWavelength {
    pub ins_name: String,
    pub eff_wave: Vec<f64>,
    pub instrument_mode: InstrumentMode,
}

impl OIWavelength {
    pub fn row_count(&self) -> usize {
        self.eff_wave.len()
    }

    /// Returns a copy of this table renamed and restricted to the channels
    /// selected by `mask` (§4.5 step 2). `mask.len()` must equal
    /// `self.row_count()`.
    pub fn resize(&self, name: &str, mask: &BitSet) -> OIWavelength {
        let eff_wave = mask.select(&self.eff_wave).into_iter().copied().collect();
        OIWavelength {
            ins_name: name.to_owned(),
            eff_wave,
            instrument_mode: self.instrument_mode,
        }
    }

    /// A verbatim copy under a (possibly suffixed) output name.
    pub fn copy_named(&self, name: &str) -> OIWavelength {
        OIWavelength {
            ins_name: name.to_owned(),
            eff_wave: self.eff_wave.clone(),
            instrument_mode: self.instrument_mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// One station entry of an `OI_ARRAY` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub sta_index: i16,
}

/// The `OI_ARRAY` table, keyed by `arr_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIArray {
    pub arr_name: String,
    pub stations: Vec<StationEntry>,
}

impl OIArray {
    pub fn copy_named(&self, name: &str) -> OIArray {
        OIArray {
            arr_name: name.to_owned(),
            stations: self.stations.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation (V2 only)
// ---------------------------------------------------------------------------

/// The `OI_CORR` table, keyed by `corr_name`. V2-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OICorr {
    pub corr_name: String,
    pub coefficients: Vec<f64>,
}

impl OICorr {
    pub fn copy_named(&self, name: &str) -> OICorr {
        OICorr {
            corr_name: name.to_owned(),
            coefficients: self.coefficients.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Data tables
// ---------------------------------------------------------------------------

/// The concrete OIFITS measurement table kinds the merge pipeline treats
/// uniformly through [`OIDataTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OIDataKind {
    Vis,
    Vis2,
    T3,
    Flux,
}

/// One measurement row: the fields the merge pipeline reads or rewrites.
/// Per-channel measurement arrays (`VISAMP`, `VISPHI`, ...) are outside the
/// scope of this crate's in-memory model (§1) — the channel `BitSet`
/// computed in §4.5 is still threaded through and applied to the owning
/// wavelength table, which is where property 5 (§8) is actually checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIDataRow {
    pub target_id: i16,
    pub night_id: i32,
    pub mjd: f64,
    pub sta_index: Vec<i16>,
}

/// One `OI_VIS` / `OI_VIS2` / `OI_T3` / `OI_FLUX` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIDataTable {
    pub kind: OIDataKind,
    pub ins_name: String,
    pub arr_name: Option<String>,
    pub corr_name: Option<String>,
    pub rows: Vec<OIDataRow>,
}

impl OIDataTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// One complete OIFITS file: an input to, or the output of, a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OIFitsFile {
    pub standard: OIFitsStandard,
    pub primary_header: OIPrimaryHDU,
    pub target_table: Option<OITarget>,
    pub wavelength_tables: Vec<OIWavelength>,
    pub array_tables: Vec<OIArray>,
    pub corr_tables: Vec<OICorr>,
    pub data_tables: Vec<OIDataTable>,
}

impl OIFitsFile {
    /// An output-shaped empty file: only the primary header is populated.
    /// Used by P1 for the null-selector short-circuit (§4.1).
    pub fn empty(standard: OIFitsStandard) -> Self {
        Self {
            standard,
            primary_header: OIPrimaryHDU::new(),
            target_table: None,
            wavelength_tables: Vec::new(),
            array_tables: Vec::new(),
            corr_tables: Vec::new(),
            data_tables: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str) -> Target {
        Target {
            name: name.to_owned(),
            ra_deg: 10.0,
            dec_deg: -20.0,
        }
    }

    #[test]
    fn primary_header_set_then_get_roundtrips() {
        let mut hdu = OIPrimaryHDU::new();
        hdu.set("TELESCOP", "VLTI");
        assert_eq!(hdu.get("TELESCOP"), Some("VLTI"));
        assert_eq!(hdu.get("MISSING"), None);
    }

    #[test]
    fn primary_header_set_twice_updates_in_place() {
        let mut hdu = OIPrimaryHDU::new();
        hdu.set("CONTENT", "OIFITS1");
        hdu.set("TELESCOP", "VLTI");
        hdu.set("CONTENT", "OIFITS2");
        assert_eq!(hdu.get("CONTENT"), Some("OIFITS2"));
        assert_eq!(
            hdu.keys().collect::<Vec<_>>(),
            vec!["CONTENT", "TELESCOP"],
            "updating an existing keyword must not move it"
        );
    }

    #[test]
    fn target_ids_returns_only_matching_rows() {
        let alpha = target("Alpha");
        let beta = target("Beta");
        let table = OITarget::new(vec![
            TargetRow {
                target_id: 1,
                target: alpha.clone(),
            },
            TargetRow {
                target_id: 2,
                target: beta,
            },
            TargetRow {
                target_id: 3,
                target: alpha.clone(),
            },
        ]);
        assert_eq!(table.target_ids(&alpha), vec![1, 3]);
    }

    #[test]
    fn wavelength_resize_filters_channels_and_renames() {
        let wl = OIWavelength {
            ins_name: "SPECTRO".to_owned(),
            eff_wave: vec![1.0, 2.0, 3.0],
            instrument_mode: InstrumentMode {
                wavelength_range: Range::new(1.0, 3.0),
            },
        };
        let mut mask = BitSet::all_clear(3);
        mask.set(0, true);
        mask.set(2, true);
        let resized = wl.resize("SPECTRO_1", &mask);
        assert_eq!(resized.ins_name, "SPECTRO_1");
        assert_eq!(resized.eff_wave, vec![1.0, 3.0]);
    }

    #[test]
    fn wavelength_copy_named_preserves_rows() {
        let wl = OIWavelength {
            ins_name: "SPECTRO".to_owned(),
            eff_wave: vec![1.0, 2.0],
            instrument_mode: InstrumentMode {
                wavelength_range: Range::new(1.0, 2.0),
            },
        };
        let copy = wl.copy_named("SPECTRO_1");
        assert_eq!(copy.eff_wave, wl.eff_wave);
        assert_ne!(copy.ins_name, wl.ins_name);
    }

    #[test]
    fn distinct_targets_with_equal_content_compare_equal() {
        assert_eq!(target("Alpha"), target("Alpha"));
        assert_ne!(target("Alpha"), target("Beta"));
    }

    #[test]
    fn empty_file_has_no_tables() {
        let file = OIFitsFile::empty(OIFitsStandard::V1);
        assert!(file.target_table.is_none());
        assert!(file.wavelength_tables.is_empty());
        assert!(file.data_tables.is_empty());
    }
}
