//! Coherence group filtering
//!
//! A lone name correspondence is weak evidence. Semantic matchings are only
//! trusted when an independent, table-wide coherence judgment corroborates
//! the same class for the same table.
//!
//! - Relation-level matchings are kept iff their key is a coherence group.
//! - Attribute-level matchings are projected to `((db, table, _), class)` and
//!   partitioned by that key; each partition is kept or discarded as a whole.

use crate::combine::CombinedMatchings;
use ahash::{AHashMap, AHashSet};
use semprop_core::{CoherenceGroups, Matching, MatchingType};
use tracing::debug;

/// Outcome of a coherence filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Corroborated matchings
    pub retained: Vec<Matching>,
    /// Number of matchings discarded
    pub discarded: usize,
    /// Number of group keys without corroboration
    pub discarded_groups: usize,
}

/// Keep a relation-level matching iff its key is a coherence group
pub fn filter_relation_level(candidates: &[Matching], groups: &CoherenceGroups) -> FilterOutcome {
    let (retained, rejected): (Vec<&Matching>, Vec<&Matching>) =
        candidates.iter().partition(|m| groups.contains(m));
    // duplicates share a key
    let discarded_groups = rejected.iter().collect::<AHashSet<_>>().len();

    debug!(
        retained = retained.len(),
        discarded = rejected.len(),
        discarded_groups,
        "relation-level coherence filter"
    );

    FilterOutcome {
        retained: retained.into_iter().cloned().collect(),
        discarded: rejected.len(),
        discarded_groups,
    }
}

/// Keep attribute-level matchings group by group.
///
/// Groups are emitted in the order their key is first seen, members in input
/// order.
pub fn filter_attribute_level(candidates: &[Matching], groups: &CoherenceGroups) -> FilterOutcome {
    let mut index: AHashMap<Matching, usize> = AHashMap::new();
    let mut partitions: Vec<(Matching, Vec<&Matching>)> = Vec::new();

    for matching in candidates {
        let key = matching.group_key();
        match index.get(&key) {
            Some(&i) => partitions[i].1.push(matching),
            None => {
                index.insert(key.clone(), partitions.len());
                partitions.push((key, vec![matching]));
            }
        }
    }

    let mut retained = Vec::with_capacity(candidates.len());
    let mut discarded = 0;
    let mut discarded_groups = 0;

    for (key, members) in partitions {
        if groups.contains(&key) {
            retained.extend(members.into_iter().cloned());
        } else {
            discarded += members.len();
            discarded_groups += 1;
        }
    }

    debug!(
        retained = retained.len(),
        discarded,
        discarded_groups,
        "attribute-level coherence filter"
    );

    FilterOutcome {
        retained,
        discarded,
        discarded_groups,
    }
}

/// Apply the coherence rule to one matcher's provenance inside a combination.
///
/// Every entry produced by `filtered_type` whose group key is not corroborated
/// loses that provenance. Because the key of a relation-level matching is the
/// matching itself, this covers both levels.
pub fn filter_combined(
    combined: &CombinedMatchings,
    filtered_type: MatchingType,
    groups: &CoherenceGroups,
) -> (CombinedMatchings, usize) {
    combined.strip_provenance(filtered_type, |m| !groups.contains(&m.group_key()))
}
