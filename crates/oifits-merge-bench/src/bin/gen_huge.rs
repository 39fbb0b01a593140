//! Generates the XLarge-tier benchmark fixture to disk.
//!
//! Run via `just gen-huge`. Writes the JSON fixture to
//! `target/bench-fixtures/` and it is loaded by `benches/huge_file.rs` at
//! benchmark time.

use std::error::Error;
use std::fs;
use std::io::BufWriter;

use oifits_merge_bench::{SizeTier, generate_oifits, huge_fixture_path};

fn main() -> Result<(), Box<dyn Error>> {
    let json_path = huge_fixture_path();

    if let Some(parent) = json_path.parent() {
        fs::create_dir_all(parent)?;
    }

    eprintln!("Generating XLarge tier (~200 targets, 60 data tables)...");
    let file = generate_oifits(&SizeTier::XLarge.config(42));

    let row_count: usize = file.data_tables.iter().map(|t| t.row_count()).sum();
    eprintln!(
        "Generated {} data tables, {row_count} rows",
        file.data_tables.len()
    );

    eprintln!("Writing JSON to {}...", json_path.display());
    let out = fs::File::create(&json_path)?;
    let writer = BufWriter::new(out);
    serde_json::to_writer(writer, &file)?;

    let json_meta = fs::metadata(&json_path)?;
    eprintln!("JSON: {:.1} MB", json_meta.len() as f64 / (1024.0 * 1024.0));

    Ok(())
}
