// specificity.rs — Pattern specificity scoring.
//
// When several rules match the same request, the most specific pattern wins
// (except that Deny always beats Allow — see engine.rs). Segment ranking,
// most to least specific:
//
//   literal segment > variable placeholder > `*` > `**`
//
// The exact weights are free; the relative ordering and tie-break
// determinism are the contract. Segment count is the secondary tiebreak so
// that longer patterns outrank shorter ones at equal weight; any remaining
// ties fall back to stable evaluation order in the engine.

use crate::path;

const LITERAL_WEIGHT: u32 = 100;
const VARIABLE_WEIGHT: u32 = 50;
const WILDCARD_WEIGHT: u32 = 10;
const GLOB_WEIGHT: u32 = 1;

/// Specificity score for a pattern. Higher = more specific.
///
/// Derived `Ord` compares fields lexicographically: summed segment weight
/// first, then segment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    weight: u32,
    segments: u32,
}

impl Specificity {
    /// Score a pattern segment by segment.
    ///
    /// A segment containing a `${name}` placeholder scores as a variable
    /// segment whether or not the request context resolves it, keeping the
    /// score a pure function of the pattern.
    pub fn of(pattern: &str) -> Self {
        let pattern = path::normalize(pattern);
        let mut weight = 0;
        let mut segments = 0;
        for segment in pattern.split('/').filter(|s| !s.is_empty()) {
            segments += 1;
            weight += if segment.contains("**") {
                GLOB_WEIGHT
            } else if segment.contains('*') {
                WILDCARD_WEIGHT
            } else if segment.contains("${") {
                VARIABLE_WEIGHT
            } else {
                LITERAL_WEIGHT
            };
        }
        Self { weight, segments }
    }
}
