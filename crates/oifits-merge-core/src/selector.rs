//! Output selection criteria, precomputed once and consumed by the merge
//! pipeline (§4.1, §4.5). The pipeline never computes what to keep; it only
//! asks a [`SelectorResult`] whether a given target, night, baseline, MJD, or
//! wavelength should be kept.

use crate::types::{Range, contains_any};

/// A single selection criterion. Every field is independently optional:
/// `None` means "this criterion does not restrict the result", matching the
/// all-or-nothing absence semantics used throughout OIFITS filtering tools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    pub target_names: Option<Vec<String>>,
    pub instrument_modes: Option<Vec<String>>,
    pub nights: Option<Vec<i32>>,
    pub baselines: Option<Vec<Vec<i16>>>,
    pub mjd_ranges: Option<Vec<Range>>,
    pub wavelength_ranges: Option<Vec<Range>>,
}

impl Selector {
    /// A selector that restricts nothing: every candidate matches.
    pub fn everything() -> Self {
        Self::default()
    }
}

/// A resolved, ready-to-query selection. `None` at the call site (rather
/// than `Some(SelectorResult::everything())`) means "select nothing at all"
/// (§4.1's null-selector short-circuit); a `Some` wrapping an all-`None`
/// [`Selector`] means "select everything".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorResult {
    pub selector: Selector,
}

impl SelectorResult {
    pub fn everything() -> Self {
        Self {
            selector: Selector::everything(),
        }
    }

    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }

    pub fn matches_target(&self, name: &str) -> bool {
        match &self.selector.target_names {
            None => true,
            Some(names) => names.iter().any(|n| n == name),
        }
    }

    pub fn matches_instrument_mode(&self, ins_name: &str) -> bool {
        match &self.selector.instrument_modes {
            None => true,
            Some(names) => names.iter().any(|n| n == ins_name),
        }
    }

    pub fn matches_night(&self, night_id: i32) -> bool {
        match &self.selector.nights {
            None => true,
            Some(nights) => nights.contains(&night_id),
        }
    }

    /// A row's baseline matches if its station-index tuple equals one of the
    /// selector's baselines, in either order (a baseline is unordered).
    pub fn matches_baseline(&self, sta_index: &[i16]) -> bool {
        match &self.selector.baselines {
            None => true,
            Some(baselines) => baselines.iter().any(|b| {
                b.len() == sta_index.len()
                    && (b == sta_index || b.iter().rev().eq(sta_index.iter()))
            }),
        }
    }

    pub fn matches_mjd(&self, mjd: f64) -> bool {
        match &self.selector.mjd_ranges {
            None => true,
            Some(ranges) => contains_any(ranges, mjd),
        }
    }

    pub fn matches_wavelength(&self, eff_wave: f64) -> bool {
        match &self.selector.wavelength_ranges {
            None => true,
            Some(ranges) => contains_any(ranges, eff_wave),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_matches_every_target_and_night() {
        let sel = SelectorResult::everything();
        assert!(sel.matches_target("Vega"));
        assert!(sel.matches_night(42));
        assert!(sel.matches_mjd(59000.0));
    }

    #[test]
    fn target_restriction_excludes_other_names() {
        let sel = SelectorResult::new(Selector {
            target_names: Some(vec!["Vega".to_owned()]),
            ..Selector::everything()
        });
        assert!(sel.matches_target("Vega"));
        assert!(!sel.matches_target("Altair"));
    }

    #[test]
    fn baseline_matches_regardless_of_station_order() {
        let sel = SelectorResult::new(Selector {
            baselines: Some(vec![vec![1, 2]]),
            ..Selector::everything()
        });
        assert!(sel.matches_baseline(&[1, 2]));
        assert!(sel.matches_baseline(&[2, 1]));
        assert!(!sel.matches_baseline(&[1, 3]));
    }

    #[test]
    fn mjd_restriction_uses_closed_interval_union() {
        let sel = SelectorResult::new(Selector {
            mjd_ranges: Some(vec![Range::new(59000.0, 59010.0)]),
            ..Selector::everything()
        });
        assert!(sel.matches_mjd(59000.0));
        assert!(sel.matches_mjd(59010.0));
        assert!(!sel.matches_mjd(59010.001));
    }

    #[test]
    fn night_restriction_checks_membership() {
        let sel = SelectorResult::new(Selector {
            nights: Some(vec![1, 3]),
            ..Selector::everything()
        });
        assert!(sel.matches_night(1));
        assert!(!sel.matches_night(2));
    }
}
