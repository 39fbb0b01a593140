//! Merge pipeline invariant tests against generated data at realistic scale.
//!
//! The core crate's own unit tests already cover these invariants on small,
//! hand-built fixtures; this suite re-checks them against larger randomized
//! files where accidental name collisions and row volume are more likely to
//! expose pipeline bugs that small fixtures miss.
#![allow(clippy::expect_used)]

use oifits_merge_bench::{SizeTier, generate_oifits};
use oifits_merge_core::{SelectorResult, merge};

fn total_rows(file: &oifits_merge_core::OIFitsFile) -> usize {
    file.data_tables.iter().map(|t| t.row_count()).sum()
}

#[test]
fn merging_a_file_with_itself_doubles_row_count() {
    let file = generate_oifits(&SizeTier::Medium.config(42));
    let before = total_rows(&file);

    let output = merge(&[file.clone(), file], Some(&SelectorResult::everything()))
        .expect("merge succeeds");

    assert_eq!(total_rows(&output.file), before * 2);
}

#[test]
fn merging_a_file_with_itself_does_not_duplicate_targets() {
    let file = generate_oifits(&SizeTier::Medium.config(7));
    let target_count_before = file
        .target_table
        .as_ref()
        .expect("target table")
        .rows
        .len();

    let output = merge(&[file.clone(), file], Some(&SelectorResult::everything()))
        .expect("merge succeeds");

    let target_count_after = output
        .file
        .target_table
        .expect("target table")
        .rows
        .len();
    assert_eq!(
        target_count_after, target_count_before,
        "identical targets across both copies must collapse into one"
    );
}

#[test]
fn merge_history_records_exactly_one_merge_line() {
    let file = generate_oifits(&SizeTier::Small.config(1));
    let output = merge(&[file.clone(), file], Some(&SelectorResult::everything()))
        .expect("merge succeeds");

    let occurrences = output
        .file
        .primary_header
        .history
        .iter()
        .filter(|l| l.as_str() == "Merged 2 OIFITS files")
        .count();
    assert_eq!(occurrences, 1);
}

#[test]
fn disjoint_files_produce_union_of_targets() {
    let file_a = generate_oifits(&SizeTier::Small.config(1));
    let file_b = generate_oifits(&SizeTier::Small.config(2));
    let count_a = file_a
        .target_table
        .as_ref()
        .expect("target table")
        .rows
        .len();
    let count_b = file_b
        .target_table
        .as_ref()
        .expect("target table")
        .rows
        .len();

    let output = merge(&[file_a, file_b], Some(&SelectorResult::everything()))
        .expect("merge succeeds");

    let merged_count = output
        .file
        .target_table
        .expect("target table")
        .rows
        .len();
    assert!(
        merged_count <= count_a + count_b,
        "merged target count must not exceed the sum of inputs"
    );
}

#[test]
fn merge_output_standard_is_the_max_of_inputs() {
    let file = generate_oifits(&SizeTier::Small.config(5));
    let output = merge(&[file.clone(), file], Some(&SelectorResult::everything()))
        .expect("merge succeeds");
    assert_eq!(output.file.standard, oifits_merge_core::OIFitsStandard::V2);
}

#[test]
fn no_warnings_on_well_formed_generated_input() {
    let file = generate_oifits(&SizeTier::Medium.config(3));
    let output = merge(&[file.clone(), file], Some(&SelectorResult::everything()))
        .expect("merge succeeds");
    assert!(
        output.warnings.is_empty(),
        "generated files should never trigger missing-reference warnings: {:?}",
        output.warnings
    );
}
