//! Synthetic OIFITS file generator and benchmark utilities.
//!
//! This crate provides deterministic generation of realistic in-memory
//! OIFITS files for benchmarking and property-based testing of
//! `oifits-merge-core`.

use std::path::PathBuf;

pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_oifits};

/// Returns the path where the huge-tier JSON fixture is stored on disk.
///
/// The file lives under `target/bench-fixtures/huge.json` so it is
/// automatically gitignored and shared between the generator binary and
/// the benchmark harness.
pub fn huge_fixture_path() -> PathBuf {
    huge_fixtures_dir().join("huge.json")
}

fn huge_fixtures_dir() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest
        .join("..")
        .join("..")
        .join("target")
        .join("bench-fixtures")
}
