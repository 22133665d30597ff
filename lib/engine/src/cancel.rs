//! Negative signal cancellation
//!
//! A semantic matcher may produce matchings it actively disbelieves. Those
//! negative signals cancel otherwise-positive candidates of the syntactic
//! matcher working on the same schema level (relation names for L42, attribute
//! names for L52).

use crate::combine::CombinedMatchings;
use ahash::AHashSet;
use semprop_core::{Matching, MatchingType};
use tracing::debug;

/// Result of cancelling a positive stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// Unique positive matchings not contradicted, in first-seen order
    pub surviving: Vec<Matching>,
    /// Number of distinct positive matchings removed
    pub cancelled: usize,
}

/// Remove from `positive` every matching present in `negative`.
///
/// The positive input is read as an immutable snapshot and the survivors are
/// written to a new collection. Repeated entries in either input count once.
pub fn cancel(positive: &[Matching], negative: &[Matching]) -> Cancellation {
    let negative: AHashSet<&Matching> = negative.iter().collect();
    let mut seen: AHashSet<&Matching> = AHashSet::with_capacity(positive.len());
    let mut surviving = Vec::with_capacity(positive.len());
    let mut cancelled = 0;

    for matching in positive {
        if !seen.insert(matching) {
            continue;
        }
        if negative.contains(matching) {
            cancelled += 1;
        } else {
            surviving.push(matching.clone());
        }
    }

    debug!(
        positives = positive.len(),
        negatives = negative.len(),
        cancelled,
        "cancelled negative pairs"
    );

    Cancellation {
        surviving,
        cancelled,
    }
}

/// Cancel inside an existing combination: drop `cancelled_type` from the
/// provenance of every combined matching present in `negative`.
///
/// Matchings backed by other matchers survive with reduced provenance.
pub fn cancel_combined(
    combined: &CombinedMatchings,
    negative: &[Matching],
    cancelled_type: MatchingType,
) -> (CombinedMatchings, usize) {
    let negative: AHashSet<&Matching> = negative.iter().collect();
    combined.strip_provenance(cancelled_type, |m| negative.contains(m))
}
