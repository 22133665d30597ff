//! Matching combination
//!
//! Merges typed candidate streams into a single provenance-tagged set. Each
//! unique matching appears once; its provenance is the set of matchers that
//! produced it. Provenance never takes part in identity.

use semprop_core::{CandidateSet, Matching, MatchingType};
use std::collections::{BTreeMap, BTreeSet};

/// Unique matchings with the set of matchers that produced each one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedMatchings {
    entries: BTreeMap<Matching, BTreeSet<MatchingType>>,
}

impl CombinedMatchings {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, matching: &Matching) -> bool {
        self.entries.contains_key(matching)
    }

    /// Matchers that produced `matching`, if it is present
    pub fn provenance(&self, matching: &Matching) -> Option<&BTreeSet<MatchingType>> {
        self.entries.get(matching)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Matching, &BTreeSet<MatchingType>)> {
        self.entries.iter()
    }

    /// Strip provenance: every unique matching exactly once, in structural order
    pub fn flatten(&self) -> Vec<Matching> {
        self.entries.keys().cloned().collect()
    }

    /// Number of matchings each matcher contributed to
    pub fn counts_by_type(&self) -> BTreeMap<MatchingType, usize> {
        let mut counts = BTreeMap::new();
        for provenance in self.entries.values() {
            for t in provenance {
                *counts.entry(*t).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Matchings corroborated by at least `k` distinct matchers
    pub fn supported_by_at_least(&self, k: usize) -> Vec<&Matching> {
        self.entries
            .iter()
            .filter(|(_, provenance)| provenance.len() >= k)
            .map(|(m, _)| m)
            .collect()
    }

    /// Remove `matching_type` from the provenance of every entry selected by
    /// `select`; entries left without provenance are dropped.
    ///
    /// Returns the new combination and the number of entries touched.
    pub fn strip_provenance<F>(&self, matching_type: MatchingType, mut select: F) -> (Self, usize)
    where
        F: FnMut(&Matching) -> bool,
    {
        let mut stripped = 0;
        let mut entries = BTreeMap::new();

        for (matching, provenance) in &self.entries {
            if provenance.contains(&matching_type) && select(matching) {
                stripped += 1;
                let remaining: BTreeSet<_> = provenance
                    .iter()
                    .copied()
                    .filter(|t| *t != matching_type)
                    .collect();
                if !remaining.is_empty() {
                    entries.insert(matching.clone(), remaining);
                }
            } else {
                entries.insert(matching.clone(), provenance.clone());
            }
        }

        (Self { entries }, stripped)
    }

    fn add(&mut self, matching_type: MatchingType, matching: &Matching) {
        self.entries
            .entry(matching.clone())
            .or_default()
            .insert(matching_type);
    }
}

/// Combine typed matching collections into one provenance map.
///
/// The result depends only on the set of `(type, matching)` pairs, never on
/// iteration order.
pub fn combine<'a, I>(typed_sets: I) -> CombinedMatchings
where
    I: IntoIterator<Item = (MatchingType, &'a [Matching])>,
{
    let mut combined = CombinedMatchings::new();
    for (matching_type, matchings) in typed_sets {
        for matching in matchings {
            combined.add(matching_type, matching);
        }
    }
    combined
}

/// Combine candidate sets, each labelled with its own matching type
pub fn combine_sets<'a, I>(sets: I) -> CombinedMatchings
where
    I: IntoIterator<Item = &'a CandidateSet>,
{
    combine(sets.into_iter().map(|s| (s.matching_type(), s.matchings())))
}
