//! Shared selector flag parsing for the `merge` command.
//!
//! Provides [`build_selector`], which converts the raw flag vectors collected
//! by clap into a [`Selector`] ready for use with
//! [`oifits_merge_core::merge`].
//!
//! # Parsing Rules
//!
//! | Flag                   | Input form | Produces                         |
//! |-------------------------|------------|-----------------------------------|
//! | `--target`              | `NAME`     | `target_names` membership          |
//! | `--instrument-mode`     | `INSNAME`  | `instrument_modes` membership       |
//! | `--night`               | `N`        | `nights` membership                 |
//! | `--mjd-range`           | `LO:HI`    | `mjd_ranges` closed-interval union  |
//! | `--wavelength-range`    | `LO:HI`    | `wavelength_ranges` closed-interval union |
//! | `--baseline`            | `A,B[,C]`  | `baselines` order-independent match |
//!
//! Every field is independently optional: an empty vector for a flag leaves
//! the corresponding [`Selector`] field as `None`, which means "this
//! criterion does not restrict the result" (§4.1's all-or-nothing absence
//! semantics), not "match nothing".

use oifits_merge_core::{Range, Selector};

use crate::error::CliError;

/// Builds a [`Selector`] from the raw flag vectors collected by clap.
///
/// # Errors
///
/// Returns [`CliError::InvalidArgument`] if any `--mjd-range`,
/// `--wavelength-range`, or `--baseline` value is malformed.
pub fn build_selector(
    targets: &[String],
    instrument_modes: &[String],
    nights: &[i32],
    mjd_ranges: &[String],
    wavelength_ranges: &[String],
    baselines: &[String],
) -> Result<Selector, CliError> {
    Ok(Selector {
        target_names: non_empty(targets.to_vec()),
        instrument_modes: non_empty(instrument_modes.to_vec()),
        nights: non_empty(nights.to_vec()),
        mjd_ranges: non_empty(parse_ranges(mjd_ranges, "--mjd-range")?),
        wavelength_ranges: non_empty(parse_ranges(wavelength_ranges, "--wavelength-range")?),
        baselines: non_empty(parse_baselines(baselines)?),
    })
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() { None } else { Some(v) }
}

/// Parses `"LO:HI"` strings into closed-interval [`Range`] values.
fn parse_ranges(values: &[String], flag: &str) -> Result<Vec<Range>, CliError> {
    values
        .iter()
        .map(|s| {
            let (lo, hi) = s.split_once(':').ok_or_else(|| CliError::InvalidArgument {
                detail: format!("{flag} {s:?}: expected the form LO:HI"),
            })?;
            let lo: f64 = lo.parse().map_err(|_| CliError::InvalidArgument {
                detail: format!("{flag} {s:?}: {lo:?} is not a number"),
            })?;
            let hi: f64 = hi.parse().map_err(|_| CliError::InvalidArgument {
                detail: format!("{flag} {s:?}: {hi:?} is not a number"),
            })?;
            Ok(Range::new(lo, hi))
        })
        .collect()
}

/// Parses `"A,B[,C...]"` strings into station-index tuples.
fn parse_baselines(values: &[String]) -> Result<Vec<Vec<i16>>, CliError> {
    values
        .iter()
        .map(|s| {
            s.split(',')
                .map(|part| {
                    part.trim()
                        .parse::<i16>()
                        .map_err(|_| CliError::InvalidArgument {
                            detail: format!(
                                "--baseline {s:?}: {part:?} is not a station index"
                            ),
                        })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn empty() -> Vec<String> {
        vec![]
    }

    #[test]
    fn all_empty_flags_produce_unrestricted_selector() {
        let sel = build_selector(&empty(), &empty(), &[], &empty(), &empty(), &empty())
            .expect("should parse");
        assert_eq!(sel, Selector::everything());
    }

    #[test]
    fn target_flag_populates_target_names() {
        let sel = build_selector(
            &["Vega".to_owned()],
            &empty(),
            &[],
            &empty(),
            &empty(),
            &empty(),
        )
        .expect("should parse");
        assert_eq!(sel.target_names, Some(vec!["Vega".to_owned()]));
    }

    #[test]
    fn mjd_range_parses_lo_hi() {
        let sel = build_selector(
            &empty(),
            &empty(),
            &[],
            &["59000:59010".to_owned()],
            &empty(),
            &empty(),
        )
        .expect("should parse");
        let ranges = sel.mjd_ranges.expect("mjd_ranges should be set");
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].contains(59000.0));
        assert!(ranges[0].contains(59010.0));
    }

    #[test]
    fn mjd_range_without_colon_is_an_error() {
        let err = build_selector(
            &empty(),
            &empty(),
            &[],
            &["59000".to_owned()],
            &empty(),
            &empty(),
        )
        .expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn baseline_parses_station_indices() {
        let sel = build_selector(
            &empty(),
            &empty(),
            &[],
            &empty(),
            &empty(),
            &["1,2".to_owned()],
        )
        .expect("should parse");
        assert_eq!(sel.baselines, Some(vec![vec![1, 2]]));
    }

    #[test]
    fn baseline_with_non_numeric_station_is_an_error() {
        let err = build_selector(
            &empty(),
            &empty(),
            &[],
            &empty(),
            &empty(),
            &["1,x".to_owned()],
        )
        .expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
    }
}
