use std::str::FromStr;
use serde::Deserialize;

/// When the reference time moves forward during a poll cycle.
///
/// - `Cycle`: snapshot the reference time when the walk starts, compare every
///   entry against that snapshot, and advance once after the walk completes
///   (default behaviour).
/// - `PerMatch`: advance the reference time to "now" right after every
///   handler call. Later entries in the same walk are then compared against
///   the moved reference, so an entry modified between the old and the new
///   reference is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAdvance {
    Cycle,
    PerMatch,
}

impl Default for ReferenceAdvance {
    fn default() -> Self {
        ReferenceAdvance::Cycle
    }
}

impl FromStr for ReferenceAdvance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cycle" => Ok(ReferenceAdvance::Cycle),
            "per_match" => Ok(ReferenceAdvance::PerMatch),
            other => Err(format!(
                "invalid reference_advance: {other} (expected \"cycle\" or \"per_match\")"
            )),
        }
    }
}
