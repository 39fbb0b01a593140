//! The small fixed vocabulary of enums used by the OIFITS data model.

use serde::{Deserialize, Serialize};

/// Which OIFITS standard revision a file or table was built for.
///
/// Ordered so that `V2 > V1` — the version-dominance rule (§4.1, §8
/// property 7) falls out of a plain `max()` over an iterator of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OIFitsStandard {
    V1,
    V2,
}

impl std::fmt::Display for OIFitsStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OIFitsStandard::V1 => "OIFITS1",
            OIFitsStandard::V2 => "OIFITS2",
        })
    }
}

impl Default for OIFitsStandard {
    fn default() -> Self {
        OIFitsStandard::V1
    }
}
