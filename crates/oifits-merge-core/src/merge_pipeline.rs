//! The six-phase OIFITS merge pipeline: output-version resolution, row
//! selection, primary-header synthesis, target renumbering, metadata
//! deduplication, and data-table rewriting.
//!
//! Each phase below is a free function taking exactly the inputs it needs
//! and returning exactly what downstream phases consume — no shared mutable
//! state threads through the pipeline, so each phase can be tested in
//! isolation from the others.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::enums::OIFitsStandard;
use crate::identity::{OrderedIdSet, TableHandle};
use crate::selector::SelectorResult;
use crate::structures::{
    MANDATORY_KEYWORDS, OIArray, OICorr, OIDataKind, OIDataRow, OIDataTable, OIFitsFile,
    OIPrimaryHDU, OITarget, OIWavelength, Target, TargetRow, VALUE_MULTI, VALUE_UNDEFINED,
};
use crate::types::{BitSet, UNDEFINED_SHORT, intersect_all};
use crate::union_find::UnionFind;

/// Two targets are considered the same logical entity when their names
/// match case-insensitively and their coordinates agree within one
/// arcsecond — real catalog entries for the same object routinely carry
/// slightly different coordinate precision between observing runs.
const TARGET_COORD_TOLERANCE_DEG: f64 = 1.0 / 3600.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    NoInputFiles,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::NoInputFiles => write!(f, "no input files were supplied to merge"),
        }
    }
}

impl std::error::Error for MergeError {}

/// Whether a [`MergeWarning`] is merely informational or reports something
/// a caller should look into. Diagnostics are modeled as return values
/// rather than log calls (SPEC_FULL.md §10.3); this lets a caller decide how
/// loudly to surface each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// A data table referenced a wavelength/array/corr table by name that
    /// does not exist in its own file. A missing wavelength reference drops
    /// the table; a missing array or corr reference keeps it, rewriting
    /// `ARRNAME` to [`crate::structures::VALUE_UNDEFINED`] or `CORRNAME` to
    /// absent instead (§4.8 Step A).
    MissingReference {
        kind: &'static str,
        name: String,
        source: String,
    },
    /// The selector matched zero rows across every input file.
    EmptySelection,
}

impl MergeWarning {
    pub fn severity(&self) -> Severity {
        match self {
            MergeWarning::MissingReference { .. } => Severity::Warning,
            MergeWarning::EmptySelection => Severity::Info,
        }
    }
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::MissingReference { kind, name, source } => {
                write!(f, "{source} references unknown {kind} table {name:?}; dropped")
            }
            MergeWarning::EmptySelection => {
                write!(f, "selector matched no rows across any input file")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Appended to the output primary header's history log, with `{n}`
    /// replaced by the number of input files merged.
    pub history_line_template: String,
    /// Written as the output primary header's `DATE` keyword (§4.3). The
    /// pipeline performs no wall-clock I/O itself (§5, §9) — a caller that
    /// wants a real calendar date supplies one here.
    pub date: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            history_line_template: "Merged {n} OIFITS files".to_owned(),
            date: VALUE_UNDEFINED.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub file: OIFitsFile,
    pub warnings: Vec<MergeWarning>,
}

/// Merges `files` into one OIFITS file, keeping only what `selector`
/// selects. `selector` being `None` short-circuits to an empty output file
/// of the dominant standard (§4.1) without looking at any table.
pub fn merge(
    files: &[OIFitsFile],
    selector: Option<&SelectorResult>,
) -> Result<MergeOutput, MergeError> {
    merge_with_config(files, selector, &MergeConfig::default())
}

pub fn merge_with_config(
    files: &[OIFitsFile],
    selector: Option<&SelectorResult>,
    config: &MergeConfig,
) -> Result<MergeOutput, MergeError> {
    if files.is_empty() {
        return Err(MergeError::NoInputFiles);
    }

    let mut warnings = Vec::new();
    let version = files.iter().map(|f| f.standard).max().unwrap_or_default();

    let Some(selector) = selector else {
        return Ok(MergeOutput {
            file: OIFitsFile::empty(version),
            warnings,
        });
    };

    let retained = collect_retained_rows(files, selector, &mut warnings);
    if retained.is_empty() {
        warnings.push(MergeWarning::EmptySelection);
        return Ok(MergeOutput {
            file: OIFitsFile::empty(version),
            warnings,
        });
    }

    let primary_header = synthesize_primary_header(files, &retained, version, config);
    let (target_table, target_remap) = remap_targets(files, &retained);
    let (wavelength_tables, wavelength_remap) = dedupe_wavelength_tables(files, &retained, selector);
    let (array_tables, array_remap) = dedupe_array_tables(files, &retained);
    let (corr_tables, corr_remap) = dedupe_corr_tables(files, &retained);
    let data_tables = rewrite_data_tables(
        files,
        &retained,
        &target_remap,
        &wavelength_remap,
        &array_remap,
        &corr_remap,
    );

    let file = OIFitsFile {
        standard: version,
        primary_header,
        target_table: Some(target_table),
        wavelength_tables,
        array_tables,
        corr_tables,
        data_tables,
    };

    Ok(MergeOutput { file, warnings })
}

// ---------------------------------------------------------------------------
// Phase 2: ReferenceCollector
// ---------------------------------------------------------------------------

/// One data table (identified by its [`TableHandle`] — owning file plus
/// position within that file's `data_tables`) and the indices of the rows
/// within it that survived selection.
///
/// `array_dangling`/`corr_dangling` record a reference that did not resolve
/// within the table's own file (§4.8 Step A): the table is still retained,
/// but P6 must rewrite `ARRNAME`/`CORRNAME` instead of looking either up in
/// the deduped-table remaps.
struct RetainedTable {
    handle: TableHandle,
    row_indices: Vec<usize>,
    array_dangling: bool,
    corr_dangling: bool,
}

fn resolve_target(file: &OIFitsFile, target_id: i16) -> Option<&Target> {
    file.target_table
        .as_ref()?
        .rows
        .iter()
        .find(|r| r.target_id == target_id)
        .map(|r| &r.target)
}

/// Walks every data table of every input file, drops tables whose
/// wavelength/array/corr references don't resolve within their own file
/// (recording a [`MergeWarning::MissingReference`] the first time each
/// distinct missing reference is seen), and applies the selector to what
/// remains.
fn collect_retained_rows(
    files: &[OIFitsFile],
    selector: &SelectorResult,
    warnings: &mut Vec<MergeWarning>,
) -> Vec<RetainedTable> {
    let mut seen_missing: HashSet<(usize, &'static str, String)> = HashSet::new();
    let mut out = Vec::new();

    for (file_idx, file) in files.iter().enumerate() {
        for (table_idx, table) in file.data_tables.iter().enumerate() {
            if !file
                .wavelength_tables
                .iter()
                .any(|w| w.ins_name == table.ins_name)
            {
                warn_missing_reference(
                    warnings,
                    &mut seen_missing,
                    file_idx,
                    "wavelength",
                    &table.ins_name,
                );
                continue;
            }
            // A dangling array/corr reference keeps the table (§4.8 Step A);
            // only a dangling wavelength reference drops it outright, above.
            let mut array_dangling = false;
            if let Some(arr_name) = &table.arr_name {
                if !file.array_tables.iter().any(|a| &a.arr_name == arr_name) {
                    warn_missing_reference(warnings, &mut seen_missing, file_idx, "array", arr_name);
                    array_dangling = true;
                }
            }
            let mut corr_dangling = false;
            if let Some(corr_name) = &table.corr_name {
                if !file.corr_tables.iter().any(|c| &c.corr_name == corr_name) {
                    warn_missing_reference(warnings, &mut seen_missing, file_idx, "corr", corr_name);
                    corr_dangling = true;
                }
            }

            let mut row_indices = Vec::new();
            for (row_idx, row) in table.rows.iter().enumerate() {
                let Some(target) = resolve_target(file, row.target_id) else {
                    warn_missing_reference(
                        warnings,
                        &mut seen_missing,
                        file_idx,
                        "target",
                        &row.target_id.to_string(),
                    );
                    continue;
                };
                if !selector.matches_target(&target.name) {
                    continue;
                }
                if !selector.matches_instrument_mode(&table.ins_name) {
                    continue;
                }
                if !selector.matches_night(row.night_id) {
                    continue;
                }
                if !selector.matches_mjd(row.mjd) {
                    continue;
                }
                if !selector.matches_baseline(&row.sta_index) {
                    continue;
                }
                row_indices.push(row_idx);
            }

            if !row_indices.is_empty() {
                out.push(RetainedTable {
                    handle: TableHandle::new(file_idx, table_idx),
                    row_indices,
                    array_dangling,
                    corr_dangling,
                });
            }
        }
    }

    out
}

fn warn_missing_reference(
    warnings: &mut Vec<MergeWarning>,
    seen: &mut HashSet<(usize, &'static str, String)>,
    file_idx: usize,
    kind: &'static str,
    name: &str,
) {
    if seen.insert((file_idx, kind, name.to_owned())) {
        warnings.push(MergeWarning::MissingReference {
            kind,
            name: name.to_owned(),
            source: format!("input file {file_idx}"),
        });
    }
}

// ---------------------------------------------------------------------------
// Phase 3: PrimaryHeaderSynthesizer
// ---------------------------------------------------------------------------

/// Builds the output primary header (§4.3).
///
/// A `V1` output gets a bare header carrying only the forced `CONTENT`/
/// `DATE` keywords. A `V2` output is built from every input file actually
/// touched by the selection (i.e. one of `retained`'s files): if exactly one
/// distinct header was touched, it is adopted verbatim (scenario S5);
/// otherwise each mandatory keyword is resolved by consensus, writing
/// [`VALUE_UNDEFINED`] where no touched header carries it and [`VALUE_MULTI`]
/// where they disagree. In every case `CONTENT`/`DATE` are then forced and
/// history lines are concatenated, deduplicated, and a final line recording
/// the merge itself is appended.
fn synthesize_primary_header(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
    version: OIFitsStandard,
    config: &MergeConfig,
) -> OIPrimaryHDU {
    let touched: Vec<&OIFitsFile> = {
        let mut indices: Vec<usize> = retained.iter().map(|rt| rt.handle.file).collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| &files[i]).collect()
    };

    let mut header = match version {
        OIFitsStandard::V1 => OIPrimaryHDU::new(),
        OIFitsStandard::V2 => synthesize_v2_header(&touched),
    };

    // Forced regardless of what consensus or verbatim adoption produced.
    header.set("CONTENT", version.to_string());
    header.set("DATE", config.date.as_str());

    let mut seen_history: OrderedIdSet<String> = OrderedIdSet::new();
    for file in &touched {
        for line in &file.primary_header.history {
            if seen_history.insert(line.clone()) {
                header.history.push(line.clone());
            }
        }
    }
    header
        .history
        .push(config.history_line_template.replace("{n}", &files.len().to_string()));

    header
}

/// The `V2`-only half of §4.3: adopt a single touched header by reference,
/// or synthesize the mandatory keywords by consensus across more than one.
fn synthesize_v2_header(touched: &[&OIFitsFile]) -> OIPrimaryHDU {
    let mut distinct: Vec<&OIPrimaryHDU> = Vec::new();
    for file in touched {
        if !distinct.iter().any(|h| **h == file.primary_header) {
            distinct.push(&file.primary_header);
        }
    }

    if let [only] = distinct.as_slice() {
        return (*only).clone();
    }

    let mut header = OIPrimaryHDU::new();
    for &key in MANDATORY_KEYWORDS {
        let mut values: Vec<&str> = Vec::new();
        for file in touched {
            if let Some(v) = file.primary_header.get(key) {
                if !values.contains(&v) {
                    values.push(v);
                }
            }
        }
        match values.as_slice() {
            [] => header.set(key, VALUE_UNDEFINED),
            [single] => header.set(key, *single),
            _ => header.set(key, VALUE_MULTI),
        }
    }
    header
}

// ---------------------------------------------------------------------------
// Phase 4: TargetRemapper
// ---------------------------------------------------------------------------

fn targets_match(a: &Target, b: &Target) -> bool {
    a.name.eq_ignore_ascii_case(&b.name)
        && (a.ra_deg - b.ra_deg).abs() < TARGET_COORD_TOLERANCE_DEG
        && (a.dec_deg - b.dec_deg).abs() < TARGET_COORD_TOLERANCE_DEG
}

/// Groups every `(file, local target id)` pair referenced by a retained row
/// into logical targets (by content, via union-find over pairwise matches,
/// exactly as [`crate::union_find`] groups identifiers elsewhere in this
/// crate's lineage), assigns each group a sequential output target ID
/// starting at 1 in first-seen order, and returns both the merged
/// `OI_TARGET` table and the lookup rewriting needs.
fn remap_targets(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
) -> (OITarget, HashMap<(usize, i16), i16>) {
    let mut refs: Vec<(usize, i16)> = Vec::new();
    let mut seen = HashSet::new();
    for rt in retained {
        let table = &files[rt.handle.file].data_tables[rt.handle.index];
        for &row_idx in &rt.row_indices {
            let key = (rt.handle.file, table.rows[row_idx].target_id);
            if seen.insert(key) {
                refs.push(key);
            }
        }
    }

    let targets: Vec<Target> = refs
        .iter()
        .map(|&(file_idx, target_id)| {
            resolve_target(&files[file_idx], target_id)
                .cloned()
                .unwrap_or(Target {
                    name: String::new(),
                    ra_deg: 0.0,
                    dec_deg: 0.0,
                })
        })
        .collect();

    let mut uf = UnionFind::new(refs.len());
    for i in 0..refs.len() {
        for j in (i + 1)..refs.len() {
            if targets_match(&targets[i], &targets[j]) {
                uf.union(i, j);
            }
        }
    }

    let mut group_to_output: HashMap<usize, i16> = HashMap::new();
    let mut rows = Vec::new();
    let mut remap = HashMap::new();
    let mut next_id: i16 = 1;

    for (i, &key) in refs.iter().enumerate() {
        let root = uf.find(i);
        let output_id = *group_to_output.entry(root).or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            rows.push(TargetRow {
                target_id: id,
                target: targets[i].clone(),
            });
            id
        });
        remap.insert(key, output_id);
    }

    (OITarget::new(rows), remap)
}

// ---------------------------------------------------------------------------
// Phase 5: MetadataDeduper x3
// ---------------------------------------------------------------------------

/// Returns `desired` if unused, otherwise `desired_1`, `desired_2`, ... —
/// the name-collision suffixing rule shared by all three dedupers (§4.6).
fn assign_unique_name(used: &mut HashSet<String>, desired: &str) -> String {
    if used.insert(desired.to_owned()) {
        return desired.to_owned();
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{desired}_{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn channel_mask(table: &OIWavelength, selector: &SelectorResult) -> BitSet {
    let mut mask = BitSet::all_clear(table.row_count());
    for (i, &eff_wave) in table.eff_wave.iter().enumerate() {
        if selector.matches_wavelength(eff_wave) {
            mask.set(i, true);
        }
    }
    mask
}

/// Resizes each referenced wavelength table to the selector's channel mask,
/// then merges tables whose resized content is identical, suffixing names
/// on collision between genuinely distinct tables (§4.5, §4.6).
fn dedupe_wavelength_tables(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
    selector: &SelectorResult,
) -> (Vec<OIWavelength>, HashMap<(usize, String), String>) {
    let mut referenced: Vec<(usize, String)> = Vec::new();
    let mut seen = HashSet::new();
    for rt in retained {
        let table = &files[rt.handle.file].data_tables[rt.handle.index];
        let key = (rt.handle.file, table.ins_name.clone());
        if seen.insert(key.clone()) {
            referenced.push(key);
        }
    }

    let mut output: Vec<OIWavelength> = Vec::new();
    let mut remap = HashMap::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for (file_idx, ins_name) in &referenced {
        let Some(source) = files[*file_idx]
            .wavelength_tables
            .iter()
            .find(|w| &w.ins_name == ins_name)
        else {
            continue;
        };

        if let Some(ranges) = &selector.selector.wavelength_ranges {
            if intersect_all(ranges, &source.instrument_mode.wavelength_range).is_empty() {
                // Empty intersection: skip the table entirely (§4.5 step 2).
                continue;
            }
        }

        let mask = channel_mask(source, selector);
        if mask.cardinality() == 0 {
            // Every channel was filtered out even though the ranges overlapped.
            continue;
        }
        let candidate = source.resize(ins_name, &mask);

        if let Some(existing) = output.iter().find(|o| {
            o.eff_wave == candidate.eff_wave && o.instrument_mode == candidate.instrument_mode
        }) {
            remap.insert((*file_idx, ins_name.clone()), existing.ins_name.clone());
            continue;
        }
        let name = assign_unique_name(&mut used_names, ins_name);
        remap.insert((*file_idx, ins_name.clone()), name.clone());
        output.push(candidate.copy_named(&name));
    }

    (output, remap)
}

/// Merges referenced array tables with identical station lists, suffixing
/// names on collision otherwise (§4.6).
fn dedupe_array_tables(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
) -> (Vec<OIArray>, HashMap<(usize, String), String>) {
    let mut referenced: Vec<(usize, String)> = Vec::new();
    let mut seen = HashSet::new();
    for rt in retained {
        if rt.array_dangling {
            continue;
        }
        let table = &files[rt.handle.file].data_tables[rt.handle.index];
        if let Some(arr_name) = &table.arr_name {
            let key = (rt.handle.file, arr_name.clone());
            if seen.insert(key.clone()) {
                referenced.push(key);
            }
        }
    }

    let mut output: Vec<OIArray> = Vec::new();
    let mut remap = HashMap::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for (file_idx, arr_name) in &referenced {
        let Some(source) = files[*file_idx]
            .array_tables
            .iter()
            .find(|a| &a.arr_name == arr_name)
        else {
            continue;
        };

        if let Some(existing) = output.iter().find(|o| o.stations == source.stations) {
            remap.insert((*file_idx, arr_name.clone()), existing.arr_name.clone());
            continue;
        }
        let name = assign_unique_name(&mut used_names, arr_name);
        remap.insert((*file_idx, arr_name.clone()), name.clone());
        output.push(source.copy_named(&name));
    }

    (output, remap)
}

/// Merges referenced `OI_CORR` tables purely by name, without comparing
/// coefficients. Unlike the wavelength and array dedupers, two correlation
/// tables from different files sharing a name are folded together even if
/// their coefficients differ — a known asymmetry preserved rather than
/// silently fixed (see SPEC_FULL.md §9).
fn dedupe_corr_tables(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
) -> (Vec<OICorr>, HashMap<(usize, String), String>) {
    let mut referenced: Vec<(usize, String)> = Vec::new();
    let mut seen = HashSet::new();
    for rt in retained {
        if rt.corr_dangling {
            continue;
        }
        let table = &files[rt.handle.file].data_tables[rt.handle.index];
        if let Some(corr_name) = &table.corr_name {
            let key = (rt.handle.file, corr_name.clone());
            if seen.insert(key.clone()) {
                referenced.push(key);
            }
        }
    }

    let mut output: Vec<OICorr> = Vec::new();
    let mut remap = HashMap::new();

    for (file_idx, corr_name) in &referenced {
        let Some(source) = files[*file_idx]
            .corr_tables
            .iter()
            .find(|c| &c.corr_name == corr_name)
        else {
            continue;
        };

        if output.iter().any(|o| &o.corr_name == corr_name) {
            remap.insert((*file_idx, corr_name.clone()), corr_name.clone());
            continue;
        }
        remap.insert((*file_idx, corr_name.clone()), corr_name.clone());
        output.push(source.copy_named(corr_name));
    }

    (output, remap)
}

// ---------------------------------------------------------------------------
// Phase 6: DataRewriter
// ---------------------------------------------------------------------------

type DataTableKey = (OIDataKind, String, Option<String>, Option<String>);

/// Rewrites every retained row with its renumbered target ID and its
/// deduplicated table references, then concatenates rows that land on the
/// same output `(kind, ins_name, arr_name, corr_name)` into a single table,
/// in first-seen order (§4.7).
fn rewrite_data_tables(
    files: &[OIFitsFile],
    retained: &[RetainedTable],
    target_remap: &HashMap<(usize, i16), i16>,
    wavelength_remap: &HashMap<(usize, String), String>,
    array_remap: &HashMap<(usize, String), String>,
    corr_remap: &HashMap<(usize, String), String>,
) -> Vec<OIDataTable> {
    let mut order: Vec<DataTableKey> = Vec::new();
    let mut by_key: HashMap<DataTableKey, Vec<OIDataRow>> = HashMap::new();

    for rt in retained {
        let source = &files[rt.handle.file].data_tables[rt.handle.index];
        let Some(ins_name) = wavelength_remap.get(&(rt.handle.file, source.ins_name.clone()))
        else {
            continue;
        };
        // A dangling array/corr reference is rewritten directly (§4.8 Step A)
        // rather than looked up in the deduped-table remap.
        let arr_name = if rt.array_dangling {
            Some(VALUE_UNDEFINED.to_owned())
        } else {
            source
                .arr_name
                .as_ref()
                .and_then(|a| array_remap.get(&(rt.handle.file, a.clone())))
                .cloned()
        };
        let corr_name = if rt.corr_dangling {
            None
        } else {
            source
                .corr_name
                .as_ref()
                .and_then(|c| corr_remap.get(&(rt.handle.file, c.clone())))
                .cloned()
        };

        let mut rows = Vec::with_capacity(rt.row_indices.len());
        for &row_idx in &rt.row_indices {
            let row = &source.rows[row_idx];
            // A lookup miss resolves to the "filtered out" sentinel (§3.2,
            // §4.4) rather than panicking; in this pipeline every retained
            // row's target was already resolved in P2, so a miss here never
            // actually happens, but the row is dropped defensively if it did.
            let target_id = target_remap
                .get(&(rt.handle.file, row.target_id))
                .copied()
                .unwrap_or(UNDEFINED_SHORT);
            if target_id == UNDEFINED_SHORT {
                continue;
            }
            rows.push(OIDataRow {
                target_id,
                night_id: row.night_id,
                mjd: row.mjd,
                sta_index: row.sta_index.clone(),
            });
        }
        if rows.is_empty() {
            continue;
        }

        let key = (source.kind, ins_name.clone(), arr_name, corr_name);
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.entry(key).or_default().extend(rows);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let rows = by_key.remove(&key)?;
            let (kind, ins_name, arr_name, corr_name) = key;
            Some(OIDataTable {
                kind,
                ins_name,
                arr_name,
                corr_name,
                rows,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::selector::Selector;
    use crate::structures::InstrumentMode;
    use crate::types::Range;

    fn target(name: &str) -> Target {
        Target {
            name: name.to_owned(),
            ra_deg: 10.0,
            dec_deg: -20.0,
        }
    }

    fn wavelength(ins_name: &str, eff_wave: Vec<f64>) -> OIWavelength {
        let lo = eff_wave.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = eff_wave.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        OIWavelength {
            ins_name: ins_name.to_owned(),
            eff_wave,
            instrument_mode: InstrumentMode {
                wavelength_range: Range::new(lo, hi),
            },
        }
    }

    fn minimal_file(standard: OIFitsStandard, target_name: &str, ins_name: &str) -> OIFitsFile {
        let mut header = OIPrimaryHDU::new();
        header.set("TELESCOP", "VLTI");
        OIFitsFile {
            standard,
            primary_header: header,
            target_table: Some(OITarget::new(vec![TargetRow {
                target_id: 1,
                target: target(target_name),
            }])),
            wavelength_tables: vec![wavelength(ins_name, vec![1.0, 2.0])],
            array_tables: Vec::new(),
            corr_tables: Vec::new(),
            data_tables: vec![OIDataTable {
                kind: OIDataKind::Vis2,
                ins_name: ins_name.to_owned(),
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

    fn everything() -> SelectorResult {
        SelectorResult::everything()
    }

    #[test]
    fn no_input_files_is_an_error() {
        let result = merge(&[], Some(&everything()));
        assert_eq!(result, Err(MergeError::NoInputFiles));
    }

    #[test]
    fn none_selector_returns_empty_file_of_dominant_version() {
        let files = vec![
            minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO"),
            minimal_file(OIFitsStandard::V2, "Altair", "SPECTRO"),
        ];
        let output = merge(&files, None).expect("merge should succeed");
        assert_eq!(output.file.standard, OIFitsStandard::V2);
        assert!(output.file.data_tables.is_empty());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn matching_targets_across_files_merge_into_one_target_and_one_table() {
        let files = vec![
            minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO"),
            minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO"),
        ];
        let output = merge(&files, Some(&everything())).expect("merge should succeed");

        let targets = output.file.target_table.expect("target table present");
        assert_eq!(targets.rows.len(), 1, "both files name the same target");

        assert_eq!(output.file.wavelength_tables.len(), 1);
        assert_eq!(output.file.data_tables.len(), 1);
        assert_eq!(output.file.data_tables[0].rows.len(), 2);
    }

    #[test]
    fn colliding_instrument_names_with_different_content_get_suffixed() {
        let mut second = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        second.wavelength_tables[0].eff_wave = vec![5.0, 6.0];
        second.data_tables[0].rows[0].sta_index = vec![3, 4];
        let files = vec![minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO"), second];

        let output = merge(&files, Some(&everything())).expect("merge should succeed");

        let names: Vec<&str> = output
            .file
            .wavelength_tables
            .iter()
            .map(|w| w.ins_name.as_str())
            .collect();
        assert_eq!(names, vec!["SPECTRO", "SPECTRO_1"]);
        assert_eq!(output.file.data_tables.len(), 2);
    }

    #[test]
    fn selector_restricted_to_one_target_drops_the_other_file() {
        let files = vec![
            minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO"),
            minimal_file(OIFitsStandard::V1, "Altair", "SPECTRO"),
        ];
        let selector = SelectorResult::new(Selector {
            target_names: Some(vec!["Vega".to_owned()]),
            ..Selector::everything()
        });

        let output = merge(&files, Some(&selector)).expect("merge should succeed");
        assert_eq!(output.file.data_tables.len(), 1);
        assert_eq!(output.file.data_tables[0].rows.len(), 1);

        let targets = output.file.target_table.expect("target table present");
        assert_eq!(targets.rows[0].target.name, "Vega");
    }

    #[test]
    fn selector_matching_nothing_yields_empty_selection_warning() {
        let files = vec![minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO")];
        let selector = SelectorResult::new(Selector {
            target_names: Some(vec!["Nonexistent".to_owned()]),
            ..Selector::everything()
        });

        let output = merge(&files, Some(&selector)).expect("merge should succeed");
        assert!(output.file.data_tables.is_empty());
        assert!(
            output
                .warnings
                .iter()
                .any(|w| *w == MergeWarning::EmptySelection)
        );
    }

    #[test]
    fn dangling_wavelength_reference_is_warned_and_dropped() {
        let mut file = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        file.data_tables[0].ins_name = "MISSING".to_owned();

        let output = merge(&[file], Some(&everything())).expect("merge should succeed");
        assert!(output.file.data_tables.is_empty());
        assert!(output.warnings.iter().any(|w| matches!(
            w,
            MergeWarning::MissingReference { kind, .. } if *kind == "wavelength"
        )));
    }

    #[test]
    fn mandatory_keyword_disagreement_becomes_value_multi() {
        // Mandatory-keyword consensus only applies to a V2 output (§4.3); a
        // V1 output's header carries only the forced CONTENT/DATE keywords.
        let mut first = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");
        first.primary_header.set("TELESCOP", "VLTI");
        let mut second = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");
        second.primary_header.set("TELESCOP", "CHARA");

        let output = merge(&[first, second], Some(&everything())).expect("merge should succeed");
        assert_eq!(output.file.primary_header.get("TELESCOP"), Some(VALUE_MULTI));
    }

    #[test]
    fn single_v2_input_adopts_primary_header_verbatim() {
        let mut file = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");
        file.primary_header.set("CONTENT", "OIFITS2");
        file.primary_header.set("DATE", "2020-01-01");
        file.primary_header.set("COMMENT1", "a free-form optional card");

        let output = merge(&[file], Some(&everything())).expect("merge should succeed");
        let header = output.file.primary_header;

        assert_eq!(header.get("TELESCOP"), Some("VLTI"));
        assert_eq!(
            header.get("COMMENT1"),
            Some("a free-form optional card"),
            "optional cards survive verbatim single-header adoption"
        );
        assert_eq!(header.get("CONTENT"), Some("OIFITS2"), "CONTENT is forced");
        assert_eq!(
            header.get("DATE"),
            Some(MergeConfig::default().date.as_str()),
            "DATE is forced to the configured value, not the input's"
        );
        assert_eq!(header.history.last().map(String::as_str), Some("Merged 1 OIFITS files"));
    }

    #[test]
    fn mandatory_keyword_absent_everywhere_becomes_undefined() {
        let mut first = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");
        first.primary_header.set("OBJECT", "Vega");
        let second = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");

        // Two distinct headers forces the multi-header consensus path (a
        // single distinct header would instead be adopted verbatim).
        let output = merge(&[first, second], Some(&everything())).expect("merge should succeed");
        assert_eq!(
            output.file.primary_header.get("OBSERVER"),
            Some("UNDEFINED"),
            "a mandatory keyword absent from every touched header gets the UNDEFINED sentinel"
        );
    }

    #[test]
    fn dangling_array_reference_keeps_table_with_undefined_arrname() {
        let mut file = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        file.data_tables[0].arr_name = Some("MISSING_ARR".to_owned());

        let output = merge(&[file], Some(&everything())).expect("merge should succeed");
        assert_eq!(output.file.data_tables.len(), 1, "table is kept, not dropped");
        assert_eq!(
            output.file.data_tables[0].arr_name,
            Some("UNDEFINED".to_owned())
        );
        assert!(output.warnings.iter().any(|w| matches!(
            w,
            MergeWarning::MissingReference { kind, .. } if *kind == "array"
        )));
    }

    #[test]
    fn dangling_corr_reference_keeps_table_with_absent_corrname() {
        let mut file = minimal_file(OIFitsStandard::V2, "Vega", "SPECTRO");
        file.data_tables[0].corr_name = Some("MISSING_CORR".to_owned());

        let output = merge(&[file], Some(&everything())).expect("merge should succeed");
        assert_eq!(output.file.data_tables.len(), 1, "table is kept, not dropped");
        assert_eq!(output.file.data_tables[0].corr_name, None);
        assert!(output.warnings.iter().any(|w| matches!(
            w,
            MergeWarning::MissingReference { kind, .. } if *kind == "corr"
        )));
    }

    #[test]
    fn wavelength_selector_excluding_every_channel_drops_table_and_data() {
        let file = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        let selector = SelectorResult::new(Selector {
            wavelength_ranges: Some(vec![Range::new(5.0, 6.0)]),
            ..Selector::everything()
        });

        let output = merge(&[file], Some(&selector)).expect("merge should succeed");
        assert!(
            output.file.wavelength_tables.is_empty(),
            "a wavelength table with no surviving channel is skipped entirely"
        );
        assert!(
            output.file.data_tables.is_empty(),
            "the referencing data table drops along with its wavelength table"
        );
    }

    #[test]
    fn history_lines_are_deduplicated_and_merge_line_appended() {
        let mut first = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        first.primary_header.history.push("observed on night 1".to_owned());
        let mut second = minimal_file(OIFitsStandard::V1, "Vega", "SPECTRO");
        second.primary_header.history.push("observed on night 1".to_owned());

        let output = merge(&[first, second], Some(&everything())).expect("merge should succeed");
        let occurrences = output
            .file
            .primary_header
            .history
            .iter()
            .filter(|l| l.as_str() == "observed on night 1")
            .count();
        assert_eq!(occurrences, 1);
        assert_eq!(
            output.file.primary_header.history.last().map(String::as_str),
            Some("Merged 2 OIFITS files")
        );
    }
}
