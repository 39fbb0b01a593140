#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod enums;
pub mod identity;
pub mod merge_pipeline;
pub mod selector;
pub mod structures;
pub mod types;
pub mod union_find;

pub use enums::OIFitsStandard;
pub use identity::{OrderedIdSet, TableHandle};
pub use merge_pipeline::{
    MergeConfig, MergeError, MergeOutput, MergeWarning, Severity, merge, merge_with_config,
};
pub use selector::{Selector, SelectorResult};
pub use structures::{
    InstrumentMode, MANDATORY_KEYWORDS, OIArray, OICorr, OIDataKind, OIDataRow, OIDataTable,
    OIFitsFile, OIPrimaryHDU, OITarget, OIWavelength, StationEntry, Target, TargetRow, VALUE_MULTI,
    VALUE_UNDEFINED,
};
pub use types::{BitSet, Range, UNDEFINED_SHORT, contains_any, intersect_all};
pub use union_find::UnionFind;

/// Returns the current version of the oifits-merge-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
